//! Run coordination: reading, dispatch, completion tracking and termination.
//!
//! A run has three moving parts:
//!
//! - a reader thread decoding records and dispatching them into the pool,
//! - the pool's workers producing one [`Outcome`] per record,
//! - the calling thread, which merges outcomes, reader exit and the operator's
//!   cancellation token in a single `select!` loop.
//!
//! The first failed record ends the run (fail-fast). Whatever the terminal
//! state, the pool is halted and every thread is joined before returning.

use crate::cancel::CancellationToken;
use crate::config::CheckConfig;
use crate::crypto::CryptoAdapter;
use crate::derive::SeedDeriver;
use crate::error::{CoreError, CoreResult};
use crate::input::CorpusFile;
use crate::pool::{Dispatcher, Outcome, VerificationPool};
use crossbeam_channel::{bounded, never, select, Receiver};
use cryptocheck_codec::{CodecError, GlobalSeed, RecordReader};
use parking_lot::Mutex;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run has started yet.
    Idle,
    /// Records are being read and dispatched.
    Reading,
    /// Everything is dispatched; waiting for the remaining outcomes.
    Draining,
    /// Every record verified.
    Done,
    /// The operator cancelled the run.
    Cancelled,
    /// The run was aborted by an error or a failed record.
    Fatal,
}

impl RunState {
    /// Returns `true` for `Done`, `Cancelled` and `Fatal`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Fatal)
    }
}

/// Totals of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Records the corpus held.
    pub total: u64,
    /// Records that verified.
    pub verified: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// How the reader thread stopped.
#[derive(Debug)]
enum ReaderExit {
    /// Clean end of stream after dispatching this many records.
    Finished { dispatched: u64 },
    /// Dispatch was refused or the operator cancelled.
    Stopped,
    /// The stream could not be decoded.
    Failed(CodecError),
}

/// Drives a verification run over a corpus.
pub struct Coordinator<A> {
    config: CheckConfig,
    adapter: Arc<A>,
    state: Mutex<RunState>,
}

impl<A: CryptoAdapter + 'static> Coordinator<A> {
    /// Creates a coordinator using `adapter` for every record.
    pub fn new(config: CheckConfig, adapter: Arc<A>) -> Self {
        Self {
            config,
            adapter,
            state: Mutex::new(RunState::Idle),
        }
    }

    /// The run configuration.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Current state of the most recent run.
    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock() = state;
    }

    /// Opens, validates and verifies the corpus at `path`.
    ///
    /// # Errors
    ///
    /// Any start-up error from [`CorpusFile::open`], plus everything
    /// [`run`](Self::run) can return.
    pub fn run_file(&self, path: &Path, cancel: &CancellationToken) -> CoreResult<RunSummary> {
        let corpus = match CorpusFile::open(path) {
            Ok(corpus) => corpus,
            Err(e) => {
                self.set_state(RunState::Fatal);
                return Err(e);
            }
        };

        info!("Seed: {}", corpus.seed());
        info!("Records count: {}", format_count(corpus.record_count()));

        let seed = corpus.seed();
        let total = corpus.record_count();
        self.run(seed, total, corpus.into_records(), cancel)
    }

    /// Verifies `total` records read from `records`.
    ///
    /// `total` is the count promised by the corpus size; a stream that ends
    /// early or runs long is an error.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UserCancellation`] if `cancel` fires before completion
    /// - [`CoreError::VerificationFailed`] for the first failed record
    /// - [`CoreError::Codec`] if the stream is malformed or unreadable
    /// - [`CoreError::RecordCountMismatch`] if the stream length disagrees with `total`
    /// - [`CoreError::WorkerFailed`] / [`CoreError::ChannelClosed`] for internal faults
    pub fn run<R>(
        &self,
        seed: GlobalSeed,
        total: u64,
        records: RecordReader<R>,
        cancel: &CancellationToken,
    ) -> CoreResult<RunSummary>
    where
        R: Read + Send + 'static,
    {
        if cancel.is_cancelled() {
            self.set_state(RunState::Cancelled);
            return Err(CoreError::UserCancellation);
        }

        let started = Instant::now();
        let deriver = Arc::new(SeedDeriver::new(seed));
        let halt = CancellationToken::new();
        let pool = VerificationPool::new(&self.config, deriver, Arc::clone(&self.adapter));
        let (dispatcher, workers) = match pool.start(&halt) {
            Ok(started) => started,
            Err(e) => {
                self.set_state(RunState::Fatal);
                return Err(e);
            }
        };

        self.set_state(RunState::Reading);
        let (exit_tx, exit_rx) = bounded::<ReaderExit>(1);
        let reader_cancel = cancel.clone();
        let spawned = thread::Builder::new()
            .name("cryptocheck-reader".into())
            .spawn(move || {
                let exit = read_and_dispatch(records, &dispatcher, &reader_cancel);
                // Sent before the dispatcher drops, so workers cannot drain
                // and disconnect ahead of this message.
                let _ = exit_tx.send(exit);
                drop(dispatcher);
            });
        let reader = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                halt.cancel();
                let _ = workers.join();
                self.set_state(RunState::Fatal);
                return Err(CoreError::WorkerFailed {
                    worker: "cryptocheck-reader".into(),
                    message: e.to_string(),
                });
            }
        };

        let tracked = self.track(total, workers.outcomes(), &exit_rx, cancel);

        halt.cancel();
        let reader_joined = reader.join();
        let workers_joined = workers.join();

        if tracked.is_err() {
            // The tracked error is the one reported; join faults are secondary.
            if reader_joined.is_err() {
                debug!("reader thread panicked during shutdown");
            }
            if let Err(e) = &workers_joined {
                debug!(error = %e, "worker failed during shutdown");
            }
        }

        let result = tracked.and_then(|verified| {
            if reader_joined.is_err() {
                return Err(CoreError::WorkerFailed {
                    worker: "cryptocheck-reader".into(),
                    message: "reader thread panicked".into(),
                });
            }
            workers_joined?;
            Ok(RunSummary {
                total,
                verified,
                elapsed: started.elapsed(),
            })
        });

        match &result {
            Ok(summary) => {
                self.set_state(RunState::Done);
                info!(
                    total = summary.total,
                    "DONE {} records in {:?}",
                    format_count(summary.verified),
                    summary.elapsed
                );
            }
            Err(CoreError::UserCancellation) => self.set_state(RunState::Cancelled),
            Err(_) => self.set_state(RunState::Fatal),
        }
        result
    }

    /// Merges outcomes until every dispatched record has reported, returning
    /// the number verified.
    fn track(
        &self,
        total: u64,
        outcomes: &Receiver<Outcome>,
        reader_exit: &Receiver<ReaderExit>,
        cancel: &CancellationToken,
    ) -> CoreResult<u64> {
        let closed_outcomes = never::<Outcome>();
        let closed_exit = never::<ReaderExit>();
        let interval = self.config.progress_interval.max(1);

        let mut completed = 0u64;
        let mut dispatched: Option<u64> = None;
        let mut outcomes_open = true;

        loop {
            if let Some(dispatched) = dispatched {
                if completed == dispatched {
                    return if dispatched == total {
                        Ok(completed)
                    } else {
                        Err(CoreError::RecordCountMismatch {
                            expected: total,
                            actual: dispatched,
                        })
                    };
                }
                if !outcomes_open {
                    return Err(CoreError::ChannelClosed { context: "outcome" });
                }
            }

            let outcome_rx = if outcomes_open { outcomes } else { &closed_outcomes };
            let exit_rx = if dispatched.is_none() { reader_exit } else { &closed_exit };

            select! {
                recv(outcome_rx) -> msg => match msg {
                    Ok(Outcome::Success) => {
                        completed += 1;
                        if completed % interval == 0 {
                            info!(
                                completed,
                                total,
                                "{} of {} records verified",
                                format_count(completed),
                                format_count(total)
                            );
                        }
                    }
                    Ok(Outcome::Failure(failure)) => {
                        return Err(CoreError::VerificationFailed(Box::new(failure)));
                    }
                    Err(_) => {
                        // Every worker is gone; the reader will notice on its
                        // next dispatch.
                        outcomes_open = false;
                    }
                },
                recv(exit_rx) -> msg => match msg {
                    Ok(ReaderExit::Finished { dispatched: count }) => {
                        debug!(dispatched = count, "reader finished");
                        self.set_state(RunState::Draining);
                        dispatched = Some(count);
                    }
                    Ok(ReaderExit::Stopped) => {
                        return Err(if cancel.is_cancelled() {
                            CoreError::UserCancellation
                        } else {
                            CoreError::ChannelClosed { context: "work" }
                        });
                    }
                    Ok(ReaderExit::Failed(e)) => return Err(e.into()),
                    Err(_) => return Err(CoreError::ChannelClosed { context: "reader" }),
                },
                recv(cancel.signal()) -> _ => {
                    debug!(completed, total, "cancellation requested");
                    return Err(CoreError::UserCancellation);
                }
            }
        }
    }
}

fn read_and_dispatch<R: Read>(
    mut records: RecordReader<R>,
    dispatcher: &Dispatcher,
    cancel: &CancellationToken,
) -> ReaderExit {
    let mut dispatched = 0u64;
    loop {
        if cancel.is_cancelled() {
            return ReaderExit::Stopped;
        }
        match records.decode_next() {
            Ok(Some(record)) => {
                if dispatcher.dispatch(record).is_err() {
                    return ReaderExit::Stopped;
                }
                dispatched += 1;
            }
            Ok(None) => return ReaderExit::Finished { dispatched },
            Err(e) => return ReaderExit::Failed(e),
        }
    }
}

/// Formats a count with `,` thousands separators.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
