//! Type-directed value formatting for `${name:format}` tokens.
//!
//! Numbers and strings use a printf-style specification, date values a
//! strftime pattern. A format the formatter rejects never fails generation;
//! the raw value string is emitted instead.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{LazyLock, Mutex};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};

use crate::template::Value;

pub(crate) fn format_value(value: &Value, format: &str) -> String {
    let formatted = match value {
        Value::Str(v) => printf(format, Arg::Str(v)),
        Value::Int(v) => printf(format, Arg::Int(*v)),
        Value::Float(v) => printf(format, Arg::Float(*v)),
        Value::Bool(_) => None,
        Value::Instant(v) => strftime(v, format),
        Value::Local(v) => strftime(v, format),
    };
    formatted.unwrap_or_else(|| value.to_string())
}

/// Parsed strftime items shared across calls, keyed by the format string.
/// `None` records a rejected format so it is not re-parsed per token.
static STRFTIME_CACHE: LazyLock<Mutex<HashMap<String, Option<Vec<Item<'static>>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn strftime<Tz>(datetime: &DateTime<Tz>, format: &str) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items = STRFTIME_CACHE
        .lock()
        .unwrap()
        .entry(format.to_string())
        .or_insert_with(|| StrftimeItems::new(format).parse_to_owned().ok())
        .clone()?;
    Some(datetime.format_with_items(items.iter()).to_string())
}

enum Arg<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
}

/// A single-argument subset of printf: `%[flags][width][.precision]conv`
/// with flags `-`, `+`, `0` and conversions `d`, `i`, `f`, `e`, `x`, `X`,
/// `o`, `s`. Literal text around the conversion is preserved; `%%` escapes a
/// percent sign. Anything else is rejected.
fn printf(spec: &str, arg: Arg) -> Option<String> {
    let mut out = String::new();
    let mut chars = spec.char_indices().peekable();
    let mut substituted = false;

    while let Some((index, ch)) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        if let Some((_, '%')) = chars.peek() {
            chars.next();
            out.push('%');
            continue;
        }
        if substituted {
            // A second conversion has no argument to consume.
            return None;
        }

        let rest = &spec[index + 1..];
        let (conversion, consumed) = parse_conversion(rest)?;
        out.push_str(&render(&conversion, &arg)?);
        substituted = true;

        // Skip over the conversion specification.
        for _ in 0..consumed {
            chars.next();
        }
    }

    Some(out)
}

struct Conversion {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    width: usize,
    precision: Option<usize>,
    conv: char,
}

/// Parses the specification following `%`, returning it with the number of
/// characters consumed.
fn parse_conversion(rest: &str) -> Option<(Conversion, usize)> {
    let mut left_align = false;
    let mut zero_pad = false;
    let mut plus_sign = false;
    let mut chars = rest.chars().peekable();
    let mut consumed = 0;

    while let Some(&c) = chars.peek() {
        match c {
            '-' => left_align = true,
            '0' => zero_pad = true,
            '+' => plus_sign = true,
            _ => break,
        }
        chars.next();
        consumed += 1;
    }

    let mut width = 0usize;
    while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
        width = width * 10 + (*c as usize - '0' as usize);
        chars.next();
        consumed += 1;
    }

    let mut precision = None;
    if chars.peek() == Some(&'.') {
        chars.next();
        consumed += 1;
        let mut digits = 0usize;
        while let Some(c) = chars.peek().filter(|c| c.is_ascii_digit()) {
            digits = digits * 10 + (*c as usize - '0' as usize);
            chars.next();
            consumed += 1;
        }
        precision = Some(digits);
    }

    let conv = chars.next()?;
    consumed += 1;

    Some((
        Conversion {
            left_align,
            zero_pad,
            plus_sign,
            width,
            precision,
            conv,
        },
        consumed,
    ))
}

fn render(conversion: &Conversion, arg: &Arg) -> Option<String> {
    let core = match (conversion.conv, arg) {
        ('d' | 'i', Arg::Int(v)) => {
            if conversion.plus_sign && *v >= 0 {
                format!("+{v}")
            } else {
                v.to_string()
            }
        }
        ('f', Arg::Float(v)) => format!("{:.*}", conversion.precision.unwrap_or(6), v),
        ('f', Arg::Int(v)) => format!("{:.*}", conversion.precision.unwrap_or(6), *v as f64),
        ('e', Arg::Float(v)) => match conversion.precision {
            Some(p) => format!("{:.*e}", p, v),
            None => format!("{v:e}"),
        },
        ('x', Arg::Int(v)) => format!("{v:x}"),
        ('X', Arg::Int(v)) => format!("{v:X}"),
        ('o', Arg::Int(v)) => format!("{v:o}"),
        ('s', arg) => {
            let text = match arg {
                Arg::Str(s) => (*s).to_string(),
                Arg::Int(v) => v.to_string(),
                Arg::Float(v) => v.to_string(),
            };
            match conversion.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            }
        }
        _ => return None,
    };

    Some(pad(core, conversion))
}

fn pad(core: String, conversion: &Conversion) -> String {
    if core.chars().count() >= conversion.width {
        return core;
    }
    let missing = conversion.width - core.chars().count();

    if conversion.left_align {
        let mut out = core;
        out.extend(std::iter::repeat_n(' ', missing));
        out
    } else if conversion.zero_pad {
        // Zeros go between the sign and the digits.
        let (sign, digits) = match core.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => match core.strip_prefix('+') {
                Some(rest) => ("+", rest),
                None => ("", core.as_str()),
            },
        };
        format!("{sign}{}{digits}", "0".repeat(missing))
    } else {
        format!("{}{core}", " ".repeat(missing))
    }
}
