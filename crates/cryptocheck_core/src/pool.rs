//! Bounded pool of verification workers.
//!
//! Records flow in through a bounded work queue and one [`Outcome`] per record
//! flows out through a bounded outcome channel. Both channels are bounded so a
//! fast reader is throttled by slow workers and memory stays proportional to
//! the queue depth.
//!
//! Workers only block on the queues. A shared halt token makes every blocked
//! send or receive return promptly; a record already being verified is
//! allowed to finish.

use crate::cancel::CancellationToken;
use crate::config::CheckConfig;
use crate::crypto::{CryptoAdapter, PublicKey};
use crate::derive::SeedDeriver;
use crate::error::{CoreError, CoreResult};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use cryptocheck_codec::Record;
use sha2::{Digest, Sha256};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Result of verifying one record.
#[derive(Debug)]
pub enum Outcome {
    /// The signature matched.
    Success,
    /// The record could not be verified.
    Failure(Failure),
}

/// Why a record failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The adapter could not derive a key pair from the account seed.
    KeyDerivationFailed {
        /// Adapter error text.
        message: String,
    },
    /// The signature did not verify against the reconstructed message.
    SignatureMismatch {
        /// Length of the reconstructed message.
        message_len: usize,
        /// SHA-256 of the reconstructed message.
        message_digest: [u8; 32],
    },
    /// The adapter panicked while handling the record.
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
}

/// Diagnostics for a failed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// The record that failed.
    pub record: Record,
    /// Public key the signature was checked against, when one was derived.
    pub public_key: Option<PublicKey>,
    /// What went wrong.
    pub reason: FailureReason,
}

impl Failure {
    fn key_derivation(record: Record, message: String) -> Self {
        Self {
            record,
            public_key: None,
            reason: FailureReason::KeyDerivationFailed { message },
        }
    }

    fn mismatch(record: Record, public_key: PublicKey, message: &[u8]) -> Self {
        Self {
            record,
            public_key: Some(public_key),
            reason: FailureReason::SignatureMismatch {
                message_len: message.len(),
                message_digest: Sha256::digest(message).into(),
            },
        }
    }

    fn panicked(record: Record, message: String) -> Self {
        Self {
            record,
            public_key: None,
            reason: FailureReason::Panicked { message },
        }
    }

    /// Returns `true` if the signature itself was rejected.
    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self.reason, FailureReason::SignatureMismatch { .. })
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::KeyDerivationFailed { message } => write!(
                f,
                "key derivation failed for record {}: {}",
                self.record, message
            ),
            FailureReason::SignatureMismatch {
                message_len,
                message_digest,
            } => {
                write!(
                    f,
                    "invalid signature for record {}, message sha256 {} ({} bytes)",
                    self.record,
                    hex::encode(message_digest),
                    message_len
                )?;
                if let Some(public_key) = &self.public_key {
                    write!(f, ", pk {}", public_key)?;
                }
                Ok(())
            }
            FailureReason::Panicked { message } => {
                write!(f, "verification panicked for record {}: {}", self.record, message)
            }
        }
    }
}

/// Verifies a single record: account seed, key pair, message, verdict.
pub fn verify_record<A>(deriver: &SeedDeriver, adapter: &A, record: &Record) -> Outcome
where
    A: CryptoAdapter + ?Sized,
{
    let account_seed = deriver.account_seed(record.index());
    let public_key = match adapter.derive_key_pair(&account_seed) {
        // The secret half is dropped (and wiped) right here.
        Ok(key_pair) => *key_pair.public_key(),
        Err(e) => return Outcome::Failure(Failure::key_derivation(*record, e.to_string())),
    };

    let message = deriver.message(record.length());
    if adapter.verify(&public_key, record.signature(), &message) {
        Outcome::Success
    } else {
        Outcome::Failure(Failure::mismatch(*record, public_key, &message))
    }
}

/// Fixed-size set of verification workers.
pub struct VerificationPool<A> {
    workers: usize,
    queue_depth: usize,
    deriver: Arc<SeedDeriver>,
    adapter: Arc<A>,
}

impl<A: CryptoAdapter + 'static> VerificationPool<A> {
    /// Creates a pool sized by `config`.
    pub fn new(config: &CheckConfig, deriver: Arc<SeedDeriver>, adapter: Arc<A>) -> Self {
        Self {
            workers: config.workers.max(1),
            queue_depth: config.queue_depth.max(1),
            deriver,
            adapter,
        }
    }

    /// Number of worker threads this pool starts.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawns the workers.
    ///
    /// Returns the only handle able to enqueue work and the handle that
    /// receives outcomes and joins the threads. Dropping the [`Dispatcher`]
    /// closes the queue; workers exit once it is drained.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WorkerFailed`] if a thread cannot be spawned. Any
    /// workers already started are halted and joined first.
    pub fn start(&self, halt: &CancellationToken) -> CoreResult<(Dispatcher, WorkerSet)> {
        let (work_tx, work_rx) = bounded::<Record>(self.queue_depth);
        let (outcome_tx, outcome_rx) = bounded::<Outcome>(self.queue_depth);

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let rx = work_rx.clone();
            let tx = outcome_tx.clone();
            let halt_worker = halt.clone();
            let deriver = Arc::clone(&self.deriver);
            let adapter = Arc::clone(&self.adapter);
            let name = format!("cryptocheck-worker-{worker_id}");

            let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
                worker_loop(worker_id, rx, tx, halt_worker, deriver, adapter)
            });
            match spawned {
                Ok(handle) => handles.push((name, handle)),
                Err(e) => {
                    halt.cancel();
                    drop(work_tx);
                    let _ = join_all(handles);
                    return Err(CoreError::WorkerFailed {
                        worker: name,
                        message: e.to_string(),
                    });
                }
            }
        }

        debug!(workers = self.workers, queue_depth = self.queue_depth, "verification pool started");

        Ok((
            Dispatcher {
                work_tx,
                halt: halt.clone(),
            },
            WorkerSet {
                outcomes: outcome_rx,
                handles,
            },
        ))
    }
}

/// Producer side of the work queue.
pub struct Dispatcher {
    work_tx: Sender<Record>,
    halt: CancellationToken,
}

/// The pool was halted or all workers have exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStopped;

impl Dispatcher {
    /// Enqueues a record, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchStopped`] if the pool is halted before the record is
    /// accepted.
    pub fn dispatch(&self, record: Record) -> Result<(), DispatchStopped> {
        if self.halt.is_cancelled() {
            return Err(DispatchStopped);
        }
        select! {
            send(self.work_tx, record) -> res => res.map_err(|_| DispatchStopped),
            recv(self.halt.signal()) -> _ => Err(DispatchStopped),
        }
    }

    /// Returns `true` once the pool has been halted.
    pub fn is_halted(&self) -> bool {
        self.halt.is_cancelled()
    }
}

/// Consumer side of the pool: outcomes and thread handles.
pub struct WorkerSet {
    outcomes: Receiver<Outcome>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerSet {
    /// Channel carrying one outcome per dispatched record.
    pub fn outcomes(&self) -> &Receiver<Outcome> {
        &self.outcomes
    }

    /// Joins every worker thread.
    ///
    /// Call after halting the pool or dropping the [`Dispatcher`], otherwise
    /// this waits for the queue to close.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WorkerFailed`] for the first thread that panicked
    /// outside of record verification.
    pub fn join(self) -> CoreResult<()> {
        drop(self.outcomes);
        join_all(self.handles)
    }
}

fn join_all(handles: Vec<(String, JoinHandle<()>)>) -> CoreResult<()> {
    let mut first_error = None;
    for (name, handle) in handles {
        if let Err(payload) = handle.join() {
            if first_error.is_none() {
                first_error = Some(CoreError::WorkerFailed {
                    worker: name,
                    message: panic_payload(&*payload),
                });
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn worker_loop<A: CryptoAdapter>(
    worker_id: usize,
    work_rx: Receiver<Record>,
    outcome_tx: Sender<Outcome>,
    halt: CancellationToken,
    deriver: Arc<SeedDeriver>,
    adapter: Arc<A>,
) {
    while !halt.is_cancelled() {
        let record = select! {
            recv(work_rx) -> msg => match msg {
                Ok(record) => record,
                Err(_) => break,
            },
            recv(halt.signal()) -> _ => break,
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            verify_record(&deriver, adapter.as_ref(), &record)
        }))
        .unwrap_or_else(|payload| Outcome::Failure(Failure::panicked(record, panic_payload(&*payload))));

        select! {
            send(outcome_tx, outcome) -> res => if res.is_err() { break },
            recv(halt.signal()) -> _ => break,
        }
    }
    debug!(worker_id, "verification worker exiting");
}

fn panic_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
