//! Codec error types.

use thiserror::Error;

/// Reasons an event or payload could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Content is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(String),

    /// zlib stream is corrupt.
    #[error("corrupt compressed payload: {0}")]
    Decompression(String),

    /// zlib stream ended early.
    #[error("compressed payload is truncated")]
    Truncated,

    /// Bytes follow the end of the zlib stream.
    #[error("{0} trailing bytes after compressed payload")]
    TrailingBytes(usize),

    /// Inflated payload exceeds the decoder limit.
    #[error("decoded payload exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Byte limit.
        limit: usize,
    },

    /// Inflated payload is not UTF-8.
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    /// A `x,y,color` record did not parse.
    #[error("malformed pixel record {line}: {record:?}")]
    MalformedRecord {
        /// 1-based record number.
        line: usize,
        /// Offending text.
        record: String,
    },

    /// Compression failed.
    #[error("compression failed: {0}")]
    Compression(String),

    /// Event has an unexpected kind.
    #[error("unexpected event kind {actual}, expected {expected}")]
    WrongKind {
        /// Kind the caller asked for.
        expected: u32,
        /// Kind on the event.
        actual: u32,
    },

    /// Event belongs to a different application.
    #[error("event belongs to another application ({0:?})")]
    ForeignApplication(Option<String>),

    /// Encoding tag names an encoding this client cannot read.
    #[error("unsupported payload encoding {0:?}")]
    UnsupportedEncoding(String),

    /// A required tag is absent or unparseable.
    #[error("missing or invalid tag {0:?}")]
    MissingTag(&'static str),

    /// Receipt description is not a serialized event.
    #[error("malformed receipt description: {0}")]
    MalformedDescription(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CodecError::WrongKind {
                expected: 90001,
                actual: 1
            }
            .to_string(),
            "unexpected event kind 1, expected 90001"
        );
        assert_eq!(
            CodecError::MissingTag("amount").to_string(),
            "missing or invalid tag \"amount\""
        );
    }
}
