//! # cryptocheck testkit
//!
//! Test utilities for cryptocheck.
//!
//! This crate provides:
//! - Corpus fixtures built from genuinely signed records
//! - Property-based test generators using proptest
//! - Golden vectors for seed and message derivation
//! - Cross-crate run helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cryptocheck_testkit::prelude::*;
//!
//! #[test]
//! fn tampered_record_fails() {
//!     let corpus = CorpusBuilder::new(GlobalSeed::new(0))
//!         .signed_range(10)
//!         .tampered(3, 40, 0)
//!         .write_temp();
//!     assert!(check_corpus(&corpus, quick_config()).is_err());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::vectors::*;
    pub use cryptocheck_codec::{GlobalSeed, Record, Signature};
    pub use cryptocheck_core::{CancellationToken, CheckConfig, CoreError};
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use vectors::*;
