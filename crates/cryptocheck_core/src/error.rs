//! Error types for cryptocheck core.

use crate::pool::Failure;
use cryptocheck_codec::CodecError;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can terminate a verification run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Corpus stream could not be decoded (includes malformed records).
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// File open, stat or read failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The corpus is smaller than a header plus one record.
    #[error("file too small: {size} bytes, need at least {minimum}")]
    UndersizedInput {
        /// Actual file size.
        size: u64,
        /// Smallest acceptable size.
        minimum: u64,
    },

    /// The corpus body is not a whole number of records.
    #[error("invalid file size {size}: {remainder} trailing bytes after the last whole record")]
    MisalignedInput {
        /// Actual file size.
        size: u64,
        /// Bytes left over after the last complete record.
        remainder: u64,
    },

    /// The stream held a different number of records than its size promised.
    #[error("record count mismatch: expected {expected}, read {actual}")]
    RecordCountMismatch {
        /// Count derived from the file size at start-up.
        expected: u64,
        /// Count actually read from the stream.
        actual: u64,
    },

    /// A crypto adapter could not produce a key pair.
    #[error("key derivation failed: {message}")]
    KeyDerivationFailed {
        /// Description from the adapter.
        message: String,
    },

    /// A record failed verification and the run was halted.
    #[error("CHECK FAILED: {0}")]
    VerificationFailed(Box<Failure>),

    /// The run was cancelled by the operator.
    #[error("user termination")]
    UserCancellation,

    /// A pool thread could not be spawned or died unexpectedly.
    #[error("worker {worker} failed: {message}")]
    WorkerFailed {
        /// Name of the thread.
        worker: String,
        /// What went wrong.
        message: String,
    },

    /// An internal channel closed before the run finished.
    #[error("{context} channel closed unexpectedly")]
    ChannelClosed {
        /// Which channel closed.
        context: &'static str,
    },
}

impl CoreError {
    /// Create a key derivation error.
    pub fn key_derivation(message: impl Into<String>) -> Self {
        Self::KeyDerivationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if the run ended because the operator cancelled it.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancellation)
    }

    /// Returns the failed record's diagnostics if this is a verification failure.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::VerificationFailed(failure) => Some(failure),
            _ => None,
        }
    }
}
