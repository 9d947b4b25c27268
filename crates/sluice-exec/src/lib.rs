#![forbid(unsafe_code)]
//! sluice-exec: the engine that owns a worker pool.
//!
//! `Engine` builds a rayon pool from an `EngineConfig` and creates parallel
//! pipelines bound to it. Pipelines created without an engine run on the
//! global rayon pool when made parallel.

pub mod runtime;

pub use runtime::Engine;
