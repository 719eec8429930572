//! # cryptocheck core
//!
//! Verification engine for signature corpora.
//!
//! This crate provides:
//! - Deterministic account seed and message reconstruction ([`SeedDeriver`])
//! - The [`CryptoAdapter`] seam and an Ed25519 implementation
//! - Corpus file validation ([`CorpusFile`])
//! - A bounded worker pool and the [`Coordinator`] that drives a run
//! - Cooperative cancellation ([`CancellationToken`])
//!
//! ```no_run
//! use cryptocheck_core::{check_file, CancellationToken};
//! use std::path::Path;
//!
//! let summary = check_file(Path::new("corpus.bin"), &CancellationToken::new())?;
//! println!("{} records verified", summary.verified);
//! # Ok::<(), cryptocheck_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod coordinator;
mod crypto;
mod derive;
mod error;
mod input;
mod pool;

pub use cancel::CancellationToken;
pub use config::{CheckConfig, DEFAULT_PROGRESS_INTERVAL};
pub use coordinator::{format_count, Coordinator, RunState, RunSummary};
pub use crypto::{
    CryptoAdapter, Ed25519Adapter, KeyPair, PublicKey, SecretKey, PUBLIC_KEY_SIZE,
    SECRET_KEY_SIZE,
};
pub use derive::{
    account_seed, message, message_len, AccountSeed, SeedDeriver, Template, ACCOUNT_SEED_SIZE,
    MAX_MESSAGE_LENGTH, TEMPLATE_LEN,
};
pub use error::{CoreError, CoreResult};
pub use input::{CorpusFile, CorpusLayout};
pub use pool::{
    verify_record, DispatchStopped, Dispatcher, Failure, FailureReason, Outcome,
    VerificationPool, WorkerSet,
};

use std::path::Path;
use std::sync::Arc;

/// Verifies the corpus at `path` with Ed25519 and the default configuration.
///
/// # Errors
///
/// See [`Coordinator::run_file`].
pub fn check_file(path: &Path, cancel: &CancellationToken) -> CoreResult<RunSummary> {
    Coordinator::new(CheckConfig::default(), Arc::new(Ed25519Adapter::new())).run_file(path, cancel)
}
