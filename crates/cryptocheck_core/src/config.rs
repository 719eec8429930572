//! Run configuration.

/// Default number of completions between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Queue slots per worker when no explicit depth is given.
const QUEUE_SLOTS_PER_WORKER: usize = 4;

/// Operational tuning for a verification run.
///
/// None of these values affect which records pass or fail.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Number of verification worker threads.
    pub workers: usize,
    /// Capacity of the work queue and of the outcome channel.
    pub queue_depth: usize,
    /// Number of completions between progress reports.
    pub progress_interval: u64,
}

impl CheckConfig {
    /// Creates a configuration sized to the available parallelism.
    pub fn new() -> Self {
        let workers = num_cpus::get().max(1);
        Self {
            workers,
            queue_depth: workers * QUEUE_SLOTS_PER_WORKER,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Sets the number of workers. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the work queue depth. Zero is treated as one.
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    /// Sets the progress interval. Zero is treated as one.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_cpu_count() {
        let config = CheckConfig::default();
        assert_eq!(config.workers, num_cpus::get().max(1));
        assert_eq!(config.queue_depth, config.workers * 4);
        assert_eq!(config.progress_interval, 100_000);
    }

    #[test]
    fn zero_values_are_clamped() {
        let config = CheckConfig::new()
            .with_workers(0)
            .with_queue_depth(0)
            .with_progress_interval(0);
        assert_eq!(config.workers, 1);
        assert_eq!(config.queue_depth, 1);
        assert_eq!(config.progress_interval, 1);
    }
}
