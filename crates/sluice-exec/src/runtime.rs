//! Engine: a configured worker pool plus pipeline constructors.

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use sluice_core::config::EngineConfig;
use sluice_core::error::{Error, Result};
use sluice_cursor::BoxCursor;
use sluice_pipeline::Pipeline;

pub struct Engine {
    cfg: EngineConfig,
    pool: Arc<ThreadPool>,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Result<Self> {
        cfg.validate()?;
        let prefix = cfg.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(cfg.parallelism)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("thread pool: {e}")))?;
        tracing::debug!(
            threads = pool.current_num_threads(),
            leaf_target_factor = cfg.leaf_target_factor,
            "engine started"
        );
        Ok(Self {
            cfg,
            pool: Arc::new(pool),
        })
    }

    /// Engine configured from `SLUICE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f` on the engine's pool.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    fn bind<T: Send + 'static>(&self, p: Pipeline<T>) -> Pipeline<T> {
        p.with_config(self.cfg.clone()).on_pool(Arc::clone(&self.pool))
    }

    pub fn from_vec<T: Send + 'static>(&self, items: Vec<T>) -> Pipeline<T> {
        self.bind(Pipeline::from_vec(items))
    }

    pub fn from_iterator<I>(&self, iter: I) -> Pipeline<I::Item>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        I::IntoIter: Send + 'static,
    {
        self.bind(Pipeline::from_iterator(iter))
    }

    pub fn from_cursor<T: Send + 'static>(&self, cursor: BoxCursor<T>) -> Pipeline<T> {
        self.bind(Pipeline::from_cursor(cursor))
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cfg", &self.cfg)
            .field("threads", &self.threads())
            .finish()
    }
}
