//! Typed payload marshaling for the gramoc algorithm protocol.
//!
//! Application values travel as text tagged with a [`DataType`] code:
//! strings as UTF-8, numbers as decimal text, numeric lists as
//! `"[v0, v1, ...]"` and maps as JSON objects (decode only).

pub mod config;
pub mod convert;
pub mod error;
pub mod value;

pub use config::{DecodeConfig, MapFallback};
pub use convert::{decode_value, decode_value_with_config, encode_value};
pub use error::{PayloadError, Result};
pub use gramoc_frame::DataType;
pub use value::Value;
