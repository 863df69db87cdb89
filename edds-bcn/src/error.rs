//! Error types for pixel encoding and decoding.

use crate::TextureFormat;
use thiserror::Error;

/// Result type for BCn operations.
pub type Result<T> = std::result::Result<T, BcnError>;

/// Errors that can occur while encoding or decoding texture payloads.
#[derive(Debug, Error)]
pub enum BcnError {
    /// The format cannot be encoded or decoded by this crate.
    #[error("unsupported texture format: {0}")]
    UnsupportedFormat(TextureFormat),

    /// A payload does not match the size implied by format and dimensions.
    #[error("payload size mismatch for {format} {width}x{height}: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch {
        format: TextureFormat,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// A surface dimension is zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}
