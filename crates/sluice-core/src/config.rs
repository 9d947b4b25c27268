//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the work-stealing pool. `0` means one per available core.
    pub parallelism: usize,

    /// Leaf tasks targeted per worker. The split threshold of a task tree is
    /// `initial_estimate / (parallelism * leaf_target_factor)`.
    pub leaf_target_factor: usize,

    /// First batch an iterator-backed cursor hands out on split; each later
    /// split doubles the previous batch.
    pub iter_batch_unit: usize,

    /// Upper bound for iterator split batches.
    pub iter_max_batch: usize,

    /// Name prefix for pool threads.
    pub thread_name_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 0,
            leaf_target_factor: 4,
            iter_batch_unit: 1 << 10,
            iter_max_batch: 1 << 25,
            thread_name_prefix: "sluice-worker".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SLUICE_PARALLELISM`: worker threads
    /// - `SLUICE_LEAF_TARGET_FACTOR`: leaf tasks per worker
    /// - `SLUICE_ITER_BATCH_UNIT`: size of the first iterator split batch
    /// - `SLUICE_ITER_MAX_BATCH`: iterator split batch cap
    /// - `SLUICE_THREAD_NAME_PREFIX`: pool thread name prefix
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = env_parse::<usize>("SLUICE_PARALLELISM") {
            cfg.parallelism = v;
        }
        if let Some(v) = env_parse::<usize>("SLUICE_LEAF_TARGET_FACTOR") {
            cfg.leaf_target_factor = v;
        }
        if let Some(v) = env_parse::<usize>("SLUICE_ITER_BATCH_UNIT") {
            cfg.iter_batch_unit = v;
        }
        if let Some(v) = env_parse::<usize>("SLUICE_ITER_MAX_BATCH") {
            cfg.iter_max_batch = v;
        }
        if let Ok(s) = std::env::var("SLUICE_THREAD_NAME_PREFIX") {
            cfg.thread_name_prefix = s;
        }

        cfg
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.leaf_target_factor == 0 {
            return Err(Error::Config("leaf_target_factor must be positive".into()));
        }
        if self.iter_batch_unit == 0 {
            return Err(Error::Config("iter_batch_unit must be positive".into()));
        }
        if self.iter_max_batch < self.iter_batch_unit {
            return Err(Error::Config(format!(
                "iter_max_batch ({}) is smaller than iter_batch_unit ({})",
                self.iter_max_batch, self.iter_batch_unit
            )));
        }
        Ok(())
    }

    /// Leaf target for a pool running `threads` workers.
    pub fn leaf_target(&self, threads: usize) -> u64 {
        (threads.max(1) as u64).saturating_mul(self.leaf_target_factor.max(1) as u64)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}
