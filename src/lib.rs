#![forbid(unsafe_code)]
//! sluice: lazily evaluated, optionally parallel data-processing pipelines.
//!
//! ```no_run
//! use sluice::prelude::*;
//!
//! let evens = Pipeline::from_vec((0..1_000).collect::<Vec<i64>>())
//!     .parallel()
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * x)
//!     .sum()?;
//! # Ok::<(), sluice::Error>(())
//! ```

pub use sluice_core as core;
pub use sluice_cursor as cursor;
pub use sluice_exec as exec;
pub use sluice_mem as mem;
pub use sluice_operators as operators;
pub use sluice_pipeline as pipeline;
pub use sluice_te as te;

pub use sluice_core::{Error, Result};
pub use sluice_exec::Engine;
pub use sluice_pipeline::Pipeline;

pub mod prelude {
    pub use sluice_core::prelude::*;
    pub use sluice_cursor::{BoxCursor, Cursor};
    pub use sluice_exec::Engine;
    pub use sluice_mem::{Node, SpineBuffer};
    pub use sluice_pipeline::{
        BytePipeline, CharPipeline, DoublePipeline, FloatPipeline, IntPipeline, LongPipeline,
        Pipeline, ShortPipeline,
    };
}
