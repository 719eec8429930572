//! Error types for the codec crate.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while reading or writing a corpus stream.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended in the middle of a record.
    #[error(
        "malformed record at offset {offset}: {available} of {expected} bytes available"
    )]
    MalformedRecord {
        /// Stream offset where the partial record starts.
        offset: u64,
        /// Number of bytes that were actually available.
        available: usize,
        /// Number of bytes a full record needs.
        expected: usize,
    },

    /// The stream ended before the global seed header was complete.
    #[error("truncated header: {available} of {expected} bytes available")]
    TruncatedHeader {
        /// Number of header bytes that were available.
        available: usize,
        /// Number of bytes the header needs.
        expected: usize,
    },

    /// A buffer handed to a decoder had the wrong size.
    #[error("invalid buffer length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
}

impl CodecError {
    /// Create a malformed record error for a partial record.
    pub fn malformed_record(offset: u64, available: usize) -> Self {
        Self::MalformedRecord {
            offset,
            available,
            expected: crate::RECORD_SIZE,
        }
    }

    /// Returns `true` if this error describes a structurally broken stream
    /// rather than an I/O failure.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
