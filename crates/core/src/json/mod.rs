//! JSON value model, strict decoder, and signing encoder.
//!
//! - `value`: [`Value`] tree and [`Utf16String`] storage for strings.
//! - `decode`: grammar parser plus the value-level validity pass.
//! - `encode`: deterministic indented re-serialization.
//! - `number`: number rendering used by the encoder.

pub mod decode;
pub mod encode;
pub mod number;
pub mod value;

pub use decode::{decode, parse, validate, DecodeError, MAX_NESTING_DEPTH};
pub use encode::encode_signing;
pub use number::format_number;
pub use value::{Map, SurrogateFault, UnpairedSurrogate, Utf16String, Value};
