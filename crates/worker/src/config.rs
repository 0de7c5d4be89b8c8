use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Recorded as `claimed_by` on every item this process claims.
    pub name: String,
    /// Maximum number of jobs running at once.
    pub concurrency: usize,
    /// How often the queue is polled for new items.
    pub poll_interval: Duration,
    /// Directory with crew YAML files overriding the built-in crews.
    pub pipeline_config_dir: Option<PathBuf>,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default        |
    /// |--------------------------|----------------|
    /// | `WORKER_NAME`            | `worker-<pid>` |
    /// | `WORKER_CONCURRENCY`     | `2`            |
    /// | `QUEUE_POLL_INTERVAL_MS` | `1000`         |
    /// | `PIPELINE_CONFIG_DIR`    | built-in crews |
    pub fn from_env() -> Self {
        let name = std::env::var("WORKER_NAME")
            .unwrap_or_else(|_| format!("worker-{}", std::process::id()));

        let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("WORKER_CONCURRENCY must be a valid usize");
        assert!(concurrency > 0, "WORKER_CONCURRENCY must be at least 1");

        let poll_interval_ms: u64 = std::env::var("QUEUE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("QUEUE_POLL_INTERVAL_MS must be a valid u64");

        let pipeline_config_dir = std::env::var("PIPELINE_CONFIG_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            name,
            concurrency,
            poll_interval: Duration::from_millis(poll_interval_ms),
            pipeline_config_dir,
        }
    }
}
