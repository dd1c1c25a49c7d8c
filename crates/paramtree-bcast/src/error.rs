//! Broadcast error types.

use paramtree_core::ParamError;
use thiserror::Error;

/// Result type alias using [`BroadcastError`].
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Errors raised by a collective parameter build.
#[derive(Error, Debug)]
pub enum BroadcastError {
    /// Loading or parsing the parameters failed on this participant.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// The transport failed or was aborted.
    #[error("broadcast transport error: {0}")]
    Transport(String),

    /// The payload does not fit the 4-byte length prefix.
    #[error("payload of {len} bytes does not fit the length prefix")]
    PayloadTooLarge {
        /// Payload size in bytes.
        len: usize,
    },

    /// The received payload is not UTF-8 text.
    #[error("broadcast payload is not valid UTF-8")]
    InvalidUtf8,

    /// A participant's buffer differs in size from the root's.
    #[error("broadcast buffer length mismatch: root sent {expected} bytes, buffer holds {received}")]
    LengthMismatch {
        /// Bytes sent by the root.
        expected: usize,
        /// Size of the receiving buffer.
        received: usize,
    },
}

impl BroadcastError {
    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// The underlying parameter error, if any.
    pub fn as_param(&self) -> Option<&ParamError> {
        match self {
            Self::Param(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_error_is_transparent() {
        let err: BroadcastError = ParamError::missing_key("x").into();
        assert_eq!(err.to_string(), ParamError::missing_key("x").to_string());
        assert!(matches!(err.as_param(), Some(ParamError::MissingKey { .. })));
    }

    #[test]
    fn test_transport_error() {
        let err = BroadcastError::transport("group aborted");
        assert!(err.to_string().contains("group aborted"));
        assert!(err.as_param().is_none());
    }
}
