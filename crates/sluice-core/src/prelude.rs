//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result, MAX_ARRAY_SIZE};
pub use crate::flags::{Characteristics, Property, StreamFlags};
pub use crate::id::{StageId, TaskId, TaskIds};
pub use crate::kind::{Numeric, Primitive};
pub use crate::sink::{BoxSink, FnSink, Sink};
