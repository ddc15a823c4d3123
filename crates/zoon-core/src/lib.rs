//! # zoon-core
//!
//! Pure-Rust encoder and decoder for **ZOON**, a compact textual
//! serialization format for semi-structured data — primarily homogeneous
//! arrays of records, but also single records and scalar lists.
//!
//! ZOON minimizes token/byte count relative to JSON by inferring a schema
//! at encode time and writing it once as a header: repeated values hoist
//! into `@key=…` constants, small string value sets become enum columns,
//! consecutive integer ids collapse to an auto-increment column with no
//! row tokens at all, and shared dotted-path prefixes shrink to `%`
//! aliases. The decoder recovers everything from the header — schemas are
//! never supplied externally.
//!
//! ## Quick start
//!
//! ```rust
//! use zoon_core::{encode, decode};
//!
//! // JSON → ZOON
//! let json = r#"[{"id":1,"role":"admin"},{"id":2,"role":"user"}]"#;
//! let zoon = encode(json).unwrap();
//! assert_eq!(zoon, "# id:i+ role:s\nadmin\nuser");
//!
//! // ZOON → JSON (roundtrip)
//! let back = decode(&zoon).unwrap();
//! assert_eq!(back, json);
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] — value → ZOON string (schema inference + emission)
//! - [`decoder`] — ZOON string → value (header grammar + unflattening)
//! - [`filter`] — dotted-path field stripping before encoding
//! - [`error`] — error type for the JSON boundary
//! - [`types`] — column schema types and lexical markers

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod types;

pub use decoder::{decode, decode_value};
pub use encoder::{encode, encode_value};
pub use error::ZoonError;
pub use filter::{filter_and_encode, filter_fields};
pub use types::{Column, TypeCode};
