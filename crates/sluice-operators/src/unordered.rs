//! Drop the encounter-order guarantee.
//!
//! The stage changes no elements. Clearing ORDERED lets later stateful and
//! terminal stages pick their cheaper unordered strategies.

use sluice_core::flags::StreamFlags;
use sluice_core::sink::BoxSink;

use crate::traits::StageOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnorderedOp;

impl<T: Send + 'static> StageOp<T, T> for UnorderedOp {
    fn name(&self) -> &'static str {
        "unordered"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::NOT_ORDERED
    }

    fn wrap_sink<'a>(&self, _upstream: StreamFlags, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        down
    }
}
