//! Codec-level errors for pathway and transaction encoding
//!
//! Every variant carries enough context to tell a truncated header from a
//! corrupted one when it shows up in debug logs.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Encode called on a context whose first checkpoint never ran
    #[error("Pathway not started: encode requires at least one checkpoint")]
    PathwayNotStarted,

    /// Header value is not valid base64
    #[error("Invalid base64 in pathway header: {reason} (length: {length})")]
    InvalidBase64 { reason: String, length: usize },

    /// Buffer is too small to contain the expected layout
    #[error("Message too small: need {need} bytes, got {got} (context: {context})")]
    MessageTooSmall {
        need: usize,
        got: usize,
        context: String,
    },

    /// Buffer carries trailing bytes after a fixed-size layout
    #[error("Unexpected length: expected {expected} bytes, got {got} (context: {context})")]
    UnexpectedLength {
        expected: usize,
        got: usize,
        context: String,
    },

    /// Decoded hash is 0, which only an unstarted context can have
    #[error("Decoded pathway hash is zero")]
    ZeroHash,
}

impl CodecError {
    pub fn message_too_small(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::MessageTooSmall {
            need,
            got,
            context: context.into(),
        }
    }

    pub fn unexpected_length(expected: usize, got: usize, context: impl Into<String>) -> Self {
        Self::UnexpectedLength {
            expected,
            got,
            context: context.into(),
        }
    }

    pub fn invalid_base64(err: base64::DecodeError, length: usize) -> Self {
        Self::InvalidBase64 {
            reason: err.to_string(),
            length,
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
