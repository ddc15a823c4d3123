//! Error types for ZOON encoding and decoding operations.

use thiserror::Error;

/// Errors surfaced by the string-level API.
///
/// The codec itself is total: [`crate::encode_value`] and
/// [`crate::decode_value`] never fail. Only the JSON boundary of
/// [`crate::encode`] and [`crate::decode`] can error.
#[derive(Error, Debug)]
pub enum ZoonError {
    /// The input was not valid JSON (encode path), or the decoded value
    /// could not be serialized back to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout zoon-core.
pub type Result<T> = std::result::Result<T, ZoonError>;
