use thiserror::Error;

/// Failures reported by the codec engine. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Missing or malformed argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The text holds a symbol the tree has no code for.
    #[error("no code for symbol {symbol:?} at position {position}")]
    Lookup { symbol: char, position: usize },

    /// Corrupted or truncated bit stream.
    #[error("malformed stream at bit {position}: {reason}")]
    MalformedStream { position: usize, reason: String },
}

impl CodecError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CodecError::InvalidInput(msg.into())
    }

    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedStream {
            position,
            reason: reason.into(),
        }
    }

    /// Stable name used on the wire and in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::InvalidInput(_) => "InvalidInput",
            CodecError::Lookup { .. } => "LookupError",
            CodecError::MalformedStream { .. } => "MalformedStream",
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
