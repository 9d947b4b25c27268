//! Split decisions.

use sluice_core::config::EngineConfig;
use sluice_cursor::BoxCursor;

/// Work that can be estimated and divided.
///
/// `try_split` returns the prefix and keeps the suffix, matching the cursor
/// contract.
pub trait Splittable: Send + Sized {
    fn estimate_size(&self) -> u64;
    fn try_split(&mut self) -> Option<Self>;
}

impl<T: 'static> Splittable for BoxCursor<T> {
    fn estimate_size(&self) -> u64 {
        (**self).estimate_size()
    }

    fn try_split(&mut self) -> Option<Self> {
        (**self).try_split()
    }
}

/// How finely a task tree divides its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    leaf_target: u64,
}

impl SplitPolicy {
    pub fn new(leaf_target: u64) -> Self {
        Self {
            leaf_target: leaf_target.max(1),
        }
    }

    /// Policy for a pool of `threads` workers.
    pub fn from_config(cfg: &EngineConfig, threads: usize) -> Self {
        Self::new(cfg.leaf_target(threads))
    }

    /// Policy for the pool the caller is running in (or the global pool).
    pub fn for_current_pool(cfg: &EngineConfig) -> Self {
        Self::from_config(cfg, rayon::current_num_threads())
    }

    pub fn leaf_target(&self) -> u64 {
        self.leaf_target
    }

    /// Pieces whose estimate is at or below this size are not split further.
    pub fn target_size(&self, estimate: u64) -> u64 {
        (estimate / self.leaf_target).max(1)
    }
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self::for_current_pool(&EngineConfig::default())
    }
}
