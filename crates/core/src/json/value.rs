use std::fmt;

use indexmap::IndexMap;

/// Object members in the order their keys were first parsed.
pub type Map = IndexMap<Utf16String, Value>;

/// A decoded JSON document.
///
/// Numbers are binary64 values, mirroring how the corpus was originally
/// produced and consumed. Strings are kept as UTF-16 code units so that
/// `\uXXXX` escapes yielding unpaired surrogates survive parsing and can be
/// judged afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Utf16String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up an object member by a UTF-8 key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(&Utf16String::from(key)))
    }
}

/// Which half of a surrogate pair was found without its partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurrogateFault {
    /// A high surrogate not immediately followed by a low surrogate.
    UnpairedHigh,
    /// A low surrogate not immediately preceded by an unconsumed high surrogate.
    UnpairedLow,
}

/// An unpaired surrogate located inside a [`Utf16String`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpairedSurrogate {
    pub index: usize,
    pub unit: u16,
    pub fault: SurrogateFault,
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// A string stored as UTF-16 code units.
///
/// Unlike `String`, this can hold unpaired surrogates. Length and hashing of
/// the signing encoding are both defined in terms of these units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Utf16String {
    units: Vec<u16>,
}

impl Utf16String {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { units: Vec::with_capacity(capacity) }
    }

    pub fn from_units(units: Vec<u16>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    /// Number of UTF-16 code units (not characters, not bytes).
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn push_unit(&mut self, unit: u16) {
        self.units.push(unit);
    }

    pub fn push_char(&mut self, c: char) {
        let mut buf = [0u16; 2];
        self.units.extend_from_slice(c.encode_utf16(&mut buf));
    }

    pub fn push_str(&mut self, s: &str) {
        self.units.extend(s.encode_utf16());
    }

    /// Find the first surrogate that is not part of a well-formed pair.
    ///
    /// A high surrogate must be immediately followed by a low surrogate; a
    /// low surrogate must immediately follow a high surrogate that has not
    /// already been paired. A high surrogate at the very end is unpaired.
    pub fn first_unpaired_surrogate(&self) -> Option<UnpairedSurrogate> {
        let mut i = 0;
        while i < self.units.len() {
            let unit = self.units[i];
            if is_high_surrogate(unit) {
                match self.units.get(i + 1) {
                    Some(&next) if is_low_surrogate(next) => {
                        i += 2;
                        continue;
                    }
                    _ => {
                        return Some(UnpairedSurrogate {
                            index: i,
                            unit,
                            fault: SurrogateFault::UnpairedHigh,
                        })
                    }
                }
            }
            if is_low_surrogate(unit) {
                return Some(UnpairedSurrogate { index: i, unit, fault: SurrogateFault::UnpairedLow });
            }
            i += 1;
        }
        None
    }

    /// Convert to UTF-8, replacing unpaired surrogates with U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

impl From<&str> for Utf16String {
    fn from(s: &str) -> Self {
        Self { units: s.encode_utf16().collect() }
    }
}

impl From<String> for Utf16String {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for Utf16String {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
