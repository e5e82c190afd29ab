use std::io::{self, BufRead};

pub(crate) use crate::comment::LINE_SEPARATOR;

/// Reads physical lines from a byte stream, recognizing `\n`, `\r\n` and bare
/// `\r` terminators. Terminated lines come back with the terminator replaced
/// by the host line separator; a final unterminated line comes back as-is.
pub(crate) struct LineReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner }
    }

    pub(crate) fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut bytes = Vec::new();

        loop {
            let byte = match self.read_byte()? {
                Some(b) => b,
                None => {
                    return if bytes.is_empty() {
                        Ok(None)
                    } else {
                        Ok(Some(decode(bytes)))
                    };
                }
            };

            match byte {
                b'\n' => {
                    let mut line = decode(bytes);
                    line.push_str(LINE_SEPARATOR);
                    return Ok(Some(line));
                }
                b'\r' => {
                    // Consume a following '\n'; anything else starts the
                    // next line.
                    if self.peek_byte()? == Some(b'\n') {
                        self.read_byte()?;
                    }
                    let mut line = decode(bytes);
                    line.push_str(LINE_SEPARATOR);
                    return Ok(Some(line));
                }
                other => bytes.push(other),
            }
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.inner.fill_buf()?;
        match buf.first().copied() {
            Some(byte) => {
                self.inner.consume(1);
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.inner.fill_buf()?.first().copied())
    }
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}
