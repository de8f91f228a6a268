//! The signing encoding: a deterministic, indented re-serialization of a
//! decoded document.
//!
//! Layout is two spaces per nesting level, `": "` between key and value, one
//! member per line, and `[]`/`{}` for empty containers. Keys keep their
//! parse order. The output is produced as UTF-16 code units because the
//! signing length and hash are defined over those units.

use super::number::format_number;
use super::value::{is_high_surrogate, is_low_surrogate, Utf16String, Value};

const INDENT: &str = "  ";

/// Produce the signing encoding of `value`.
pub fn encode_signing(value: &Value) -> Utf16String {
    let mut out = Utf16String::with_capacity(64);
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut Utf16String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_char('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_char(',');
                }
                write_newline(out, depth + 1);
                write_value(out, item, depth + 1);
            }
            write_newline(out, depth);
            out.push_char(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_char('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_char(',');
                }
                write_newline(out, depth + 1);
                write_string(out, key);
                out.push_str(": ");
                write_value(out, item, depth + 1);
            }
            write_newline(out, depth);
            out.push_char('}');
        }
    }
}

fn write_newline(out: &mut Utf16String, depth: usize) {
    out.push_char('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_string(out: &mut Utf16String, s: &Utf16String) {
    out.push_char('"');
    let units = s.units();
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        match unit {
            0x22 => out.push_str("\\\""),
            0x5C => out.push_str("\\\\"),
            0x08 => out.push_str("\\b"),
            0x0C => out.push_str("\\f"),
            0x0A => out.push_str("\\n"),
            0x0D => out.push_str("\\r"),
            0x09 => out.push_str("\\t"),
            0x00..=0x1F => write_unicode_escape(out, unit),
            _ if is_high_surrogate(unit) => match units.get(i + 1) {
                Some(&low) if is_low_surrogate(low) => {
                    out.push_unit(unit);
                    out.push_unit(low);
                    i += 1;
                }
                _ => write_unicode_escape(out, unit),
            },
            _ if is_low_surrogate(unit) => write_unicode_escape(out, unit),
            _ => out.push_unit(unit),
        }
        i += 1;
    }
    out.push_char('"');
}

fn write_unicode_escape(out: &mut Utf16String, unit: u16) {
    out.push_str(&format!("\\u{unit:04x}"));
}
