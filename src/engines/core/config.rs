//! Worker pool configuration

use serde::{Deserialize, Serialize};

use super::parallel::default_num_threads;

/// Default prefix for worker thread names
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "list-worker";

/// Settings used to build a [`WorkerPool`](super::pool::WorkerPool)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of persistent worker threads
    pub worker_count: usize,
    /// Worker threads are named `{prefix}-{id}`
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_num_threads(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    /// Set the number of worker threads
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the prefix used to name worker threads
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert!(config.worker_count > 0);
        assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::default()
            .with_worker_count(3)
            .with_thread_name_prefix("mapper");
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.thread_name_prefix, "mapper");
    }

    #[test]
    fn test_serde_round_trip() {
        let config = PoolConfig::default()
            .with_worker_count(6)
            .with_thread_name_prefix("batch");

        let json = serde_json::to_string(&config).unwrap();
        let parsed: PoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: PoolConfig = serde_json::from_str(r#"{"worker_count": 2}"#).unwrap();
        assert_eq!(parsed.worker_count, 2);
        assert_eq!(parsed.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    }
}
