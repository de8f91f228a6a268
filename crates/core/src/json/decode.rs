//! Strict JSON decoding.
//!
//! Decoding is two-phase: [`parse`] turns text into a [`Value`] following the
//! plain JSON grammar, then [`validate`] walks the tree and rejects values the
//! corpus considers invalid even though the grammar allows them:
//!
//! - numbers that evaluate to positive or negative infinity (`1e400`)
//! - negative zero (`-0`, `-0.0e5`, `-1e-400`)
//! - string values containing an unpaired UTF-16 surrogate
//!
//! Object keys are not inspected by the validity pass; only values are.
//! The first violation in document order aborts the decode.

use thiserror::Error;

use super::value::{Map, SurrogateFault, Utf16String, Value};

/// Maximum nesting of arrays and objects accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Error returned when a document fails to parse or fails the validity pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("invalid number literal at offset {offset}")]
    InvalidNumber { offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("unescaped control character U+{unit:04X} in string at offset {offset}")]
    ControlCharacter { unit: u32, offset: usize },

    #[error("trailing characters after JSON value at offset {offset}")]
    TrailingCharacters { offset: usize },

    #[error("nesting depth exceeds {MAX_NESTING_DEPTH} at offset {offset}")]
    NestingTooDeep { offset: usize },

    #[error("non-finite number {value} at '{path}'")]
    NonFiniteNumber { value: f64, path: String },

    #[error("negative zero at '{path}'")]
    NegativeZero { path: String },

    #[error("unpaired {kind} surrogate {unit:#06x} at code unit {index} of string at '{path}'")]
    UnpairedSurrogate { kind: &'static str, unit: u16, index: usize, path: String },
}

/// Parse and validate a document.
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    let value = parse(text)?;
    validate(&value)?;
    Ok(value)
}

/// Parse a document against the JSON grammar only, without the validity pass.
pub fn parse(text: &str) -> Result<Value, DecodeError> {
    let mut parser = Parser { text, bytes: text.as_bytes(), pos: 0, depth: 0 };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(DecodeError::TrailingCharacters { offset: parser.pos });
    }
    Ok(value)
}

/// Run the value-level validity rules over an already parsed tree.
pub fn validate(value: &Value) -> Result<(), DecodeError> {
    let mut path = String::new();
    validate_at(value, &mut path)
}

fn validate_at(value: &Value, path: &mut String) -> Result<(), DecodeError> {
    match value {
        Value::Null | Value::Bool(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_finite() {
                return Err(DecodeError::NonFiniteNumber { value: *n, path: path.clone() });
            }
            if *n == 0.0 && n.is_sign_negative() {
                return Err(DecodeError::NegativeZero { path: path.clone() });
            }
            Ok(())
        }
        Value::String(s) => match s.first_unpaired_surrogate() {
            Some(bad) => Err(DecodeError::UnpairedSurrogate {
                kind: match bad.fault {
                    SurrogateFault::UnpairedHigh => "high",
                    SurrogateFault::UnpairedLow => "low",
                },
                unit: bad.unit,
                index: bad.index,
                path: path.clone(),
            }),
            None => Ok(()),
        },
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let len = path.len();
                path.push('/');
                path.push_str(&i.to_string());
                validate_at(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, item) in map {
                let len = path.len();
                path.push('/');
                path.push_str(&pointer_escape(&key.to_string_lossy()));
                validate_at(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
    }
}

fn pointer_escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> DecodeError {
        match self.text[self.pos..].chars().next() {
            Some(found) => DecodeError::UnexpectedChar { found, offset: self.pos },
            None => DecodeError::UnexpectedEnd { offset: self.pos },
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_value(&mut self) -> Result<Value, DecodeError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => Ok(Value::String(self.parse_string()?)),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Value, DecodeError> {
        for expected in word.bytes() {
            self.expect(expected)?;
        }
        Ok(value)
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep { offset: self.pos });
        }
        Ok(())
    }

    fn parse_array(&mut self) -> Result<Value, DecodeError> {
        self.enter()?;
        self.pos += 1;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value, DecodeError> {
        self.enter()?;
        self.pos += 1;
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.unexpected());
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':')?;
            let value = self.parse_value()?;
            // A repeated key keeps its first position and takes the later value.
            map.insert(key, value);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }
        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_string(&mut self) -> Result<Utf16String, DecodeError> {
        self.expect(b'"')?;
        let mut out = Utf16String::new();
        let mut run_start = self.pos;
        loop {
            let Some(byte) = self.peek() else {
                return Err(DecodeError::UnexpectedEnd { offset: self.pos });
            };
            match byte {
                b'"' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                0x00..=0x1F => {
                    return Err(DecodeError::ControlCharacter {
                        unit: u32::from(byte),
                        offset: self.pos,
                    });
                }
                _ => self.pos += 1,
            }
        }
    }

    fn parse_escape(&mut self, out: &mut Utf16String) -> Result<(), DecodeError> {
        let start = self.pos;
        self.pos += 1;
        let Some(kind) = self.peek() else {
            return Err(DecodeError::UnexpectedEnd { offset: self.pos });
        };
        self.pos += 1;
        let unit = match kind {
            b'"' => 0x22,
            b'\\' => 0x5C,
            b'/' => 0x2F,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => 0x0A,
            b'r' => 0x0D,
            b't' => 0x09,
            b'u' => {
                let hex = self
                    .bytes
                    .get(self.pos..self.pos + 4)
                    .filter(|digits| digits.iter().all(u8::is_ascii_hexdigit))
                    .ok_or(DecodeError::InvalidEscape { offset: start })?;
                self.pos += 4;
                // Surrogates are stored as-is; pairing is judged by the validity pass.
                hex.iter().fold(0u16, |acc, digit| (acc << 4) | hex_value(*digit))
            }
            _ => return Err(DecodeError::InvalidEscape { offset: start }),
        };
        out.push_unit(unit);
        Ok(())
    }

    fn parse_number(&mut self) -> Result<Value, DecodeError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(DecodeError::InvalidNumber { offset: start }),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(DecodeError::InvalidNumber { offset: start });
            }
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(DecodeError::InvalidNumber { offset: start });
            }
            self.skip_digits();
        }
        // Overflow becomes infinity and underflow becomes zero; the validity
        // pass decides whether that is acceptable.
        self.text[start..self.pos]
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| DecodeError::InvalidNumber { offset: start })
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }
}

fn hex_value(digit: u8) -> u16 {
    let value = match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    };
    u16::from(value)
}
