//! Check command implementation.

use clap::Args;
use cryptocheck_core::{CancellationToken, CheckConfig, Coordinator, Ed25519Adapter};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Worker pool tuning flags.
#[derive(Debug, Default, Args)]
pub struct Tuning {
    /// Number of verification workers (default: number of CPUs)
    #[arg(global = true, long)]
    pub workers: Option<usize>,

    /// Work queue depth (default: 4 per worker)
    #[arg(global = true, long)]
    pub queue_depth: Option<usize>,

    /// Completions between progress reports
    #[arg(global = true, long)]
    pub progress_interval: Option<u64>,
}

impl Tuning {
    /// Builds the run configuration, keeping defaults for unset flags.
    pub fn into_config(self) -> CheckConfig {
        let mut config = CheckConfig::new();
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
            let workers = config.workers;
            config = config.with_queue_depth(workers * 4);
        }
        if let Some(depth) = self.queue_depth {
            config = config.with_queue_depth(depth);
        }
        if let Some(interval) = self.progress_interval {
            config = config.with_progress_interval(interval);
        }
        config
    }
}

/// Runs the check command.
///
/// Ctrl-C cancels the run; the coordinator itself runs on a blocking thread.
pub async fn run(path: &Path, config: CheckConfig) -> Result<(), Box<dyn std::error::Error>> {
    run_with_cancel(path, config, CancellationToken::new()).await
}

/// Runs the check command with an existing cancellation token.
///
/// Returns `Ok` only when every record verified.
pub async fn run_with_cancel(
    path: &Path,
    config: CheckConfig,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(
        workers = config.workers,
        queue_depth = config.queue_depth,
        "starting check"
    );

    let interrupt = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, stopping");
            interrupt.cancel();
        }
    });

    let path = path.to_path_buf();
    let joined = tokio::task::spawn_blocking(move || {
        Coordinator::new(config, Arc::new(Ed25519Adapter::new())).run_file(&path, &cancel)
    })
    .await;
    signal_task.abort();

    let summary = joined??;
    debug!(
        verified = summary.verified,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "check finished"
    );
    Ok(())
}
