//! Execution context carried by a pipeline.

use std::sync::Arc;

use rayon::ThreadPool;

use sluice_core::config::EngineConfig;
use sluice_te::SplitPolicy;

#[derive(Clone)]
pub struct ExecContext {
    parallel: bool,
    pool: Option<Arc<ThreadPool>>,
    config: Arc<EngineConfig>,
}

impl ExecContext {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            parallel: false,
            pool: None,
            config,
        }
    }

    /// Parallel evaluation on `pool` instead of the global rayon pool.
    pub fn with_pool(pool: Arc<ThreadPool>, config: Arc<EngineConfig>) -> Self {
        Self {
            parallel: true,
            pool: Some(pool),
            config,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: Arc<EngineConfig>) {
        self.config = config;
    }

    /// Split policy for the pool this context evaluates on. Call from inside
    /// [`ExecContext::install`].
    pub fn policy(&self) -> SplitPolicy {
        SplitPolicy::for_current_pool(&self.config)
    }

    /// Run `f` on the context's pool, or on the calling thread when the
    /// context has none (sequential, or the global pool).
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) if self.parallel => pool.install(f),
            _ => f(),
        }
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::new(Arc::new(EngineConfig::default()))
    }
}

impl std::fmt::Debug for ExecContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecContext")
            .field("parallel", &self.parallel)
            .field(
                "pool_threads",
                &self.pool.as_ref().map(|p| p.current_num_threads()),
            )
            .field("config", &self.config)
            .finish()
    }
}
