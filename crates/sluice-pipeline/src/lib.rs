#![forbid(unsafe_code)]
//! sluice-pipeline: the stage graph and the `Pipeline` facade.
//!
//! A `Pipeline<T>` records its stages in a [`StageGraph`] and a chain of
//! lazily opened segment sources. Terminals consume the pipeline, open the
//! chain and hand it to a terminal operator, sequentially or as a task tree.
//! In parallel mode every stateful stage is evaluated to a node before the
//! stages after it run.

pub mod context;
pub mod pipeline;
mod source;
pub mod stage;

pub use context::ExecContext;
pub use pipeline::Pipeline;
pub use stage::{LinkState, StageGraph, StageKind, StageRecord};

pub type BytePipeline = Pipeline<i8>;
pub type ShortPipeline = Pipeline<i16>;
pub type CharPipeline = Pipeline<char>;
pub type IntPipeline = Pipeline<i32>;
pub type LongPipeline = Pipeline<i64>;
pub type FloatPipeline = Pipeline<f32>;
pub type DoublePipeline = Pipeline<f64>;
