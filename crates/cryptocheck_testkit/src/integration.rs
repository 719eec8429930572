//! Cross-crate integration test helpers.

use crate::fixtures::TempCorpus;
use cryptocheck_codec::Signature;
use cryptocheck_core::{
    AccountSeed, CancellationToken, CheckConfig, Coordinator, CoreResult, CryptoAdapter,
    Ed25519Adapter, KeyPair, PublicKey, RunSummary,
};
use std::sync::Arc;
use std::time::Duration;

/// A small pool suitable for tests: two workers, shallow queue.
pub fn quick_config() -> CheckConfig {
    CheckConfig::new()
        .with_workers(2)
        .with_queue_depth(4)
        .with_progress_interval(1000)
}

/// Verifies `corpus` with Ed25519.
pub fn check_corpus(corpus: &TempCorpus, config: CheckConfig) -> CoreResult<RunSummary> {
    check_corpus_with(corpus, config, Ed25519Adapter::new(), &CancellationToken::new())
}

/// Verifies `corpus` with a custom adapter and cancellation token.
pub fn check_corpus_with<A: CryptoAdapter + 'static>(
    corpus: &TempCorpus,
    config: CheckConfig,
    adapter: A,
    cancel: &CancellationToken,
) -> CoreResult<RunSummary> {
    Coordinator::new(config, Arc::new(adapter)).run_file(corpus.path(), cancel)
}

/// Ed25519 adapter that sleeps before every verification.
///
/// Keeps a run in flight long enough to exercise cancellation.
#[derive(Debug, Clone, Copy)]
pub struct SlowAdapter {
    inner: Ed25519Adapter,
    delay: Duration,
}

impl SlowAdapter {
    /// Creates an adapter delaying each verification by `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Ed25519Adapter::new(),
            delay,
        }
    }
}

impl CryptoAdapter for SlowAdapter {
    fn derive_key_pair(&self, seed: &AccountSeed) -> CoreResult<KeyPair> {
        self.inner.derive_key_pair(seed)
    }

    fn verify(&self, public_key: &PublicKey, signature: &Signature, message: &[u8]) -> bool {
        std::thread::sleep(self.delay);
        self.inner.verify(public_key, signature, message)
    }
}
