#![forbid(unsafe_code)]
//! sluice-core: shared vocabulary of the sluice engine.
//!
//! - `flags`: the stream flag registry and cursor characteristics.
//! - `sink`: the push-based begin/accept/end consumer protocol.
//! - `kind`: element kinds (boxed reference plus seven primitive kinds).
//! - `config`, `error`, `id`: ambient engine concerns.
//!
//! No threads, no executors here. Higher crates build cursors, buffers, tasks
//! and pipelines on top of these types.

pub mod config;
pub mod error;
pub mod flags;
pub mod id;
pub mod kind;
pub mod prelude;
pub mod sink;

pub use error::{Error, Result, MAX_ARRAY_SIZE};
pub use flags::{Characteristics, Property, StreamFlags};
pub use sink::{BoxSink, FnSink, Sink};
