//! Operator traits.
//!
//! Intermediate operators (`StageOp`) describe how one stage transforms a
//! stream: its op flags and the sink it puts in front of its downstream
//! sink. Stateful operators (`StatefulOp`) additionally know how to evaluate
//! themselves over a parallel upstream. Terminal operators (`TerminalOp`)
//! consume a segment into a final result.
//!
//! Invariants:
//! - Operators are immutable once built and shared between tasks.
//! - A sink returned by `wrap_sink` owns everything it needs and never
//!   borrows the operator, so it can outlive the call.

use sluice_core::error::Result;
use sluice_core::flags::{Property, StreamFlags};
use sluice_core::sink::BoxSink;
use sluice_mem::Node;
use sluice_te::SplitPolicy;

use crate::segment::{BoxSegment, CursorSegment};

pub trait StageOp<In: Send + 'static, Out: Send + 'static>: Send + Sync + 'static {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    /// Op flags: the properties this stage sets or clears.
    fn flags(&self) -> StreamFlags;

    /// The stage's parallel evaluation when it needs to see its entire input
    /// before emitting (sort, distinct, slice). Parallel evaluation
    /// materializes at such stages.
    fn as_stateful(&self) -> Option<&dyn StatefulOp<In, Out>> {
        None
    }

    fn is_stateful(&self) -> bool {
        self.as_stateful().is_some()
    }

    /// Build the sink for this stage, feeding `down`. `upstream` holds the
    /// combined flags of the previous stage and lets a stage turn itself into
    /// a pass-through.
    fn wrap_sink<'a>(&self, upstream: StreamFlags, down: BoxSink<'a, Out>) -> BoxSink<'a, In>;
}

/// A stage that buffers or counts its whole input.
pub trait StatefulOp<In: Send + 'static, Out: Send + 'static>: StageOp<In, Out> {
    /// Evaluate this stage over a parallel upstream into a node.
    fn evaluate_parallel(&self, upstream: BoxSegment<In>, policy: &SplitPolicy) -> Result<Node<Out>>;

    /// Evaluate this stage over a parallel upstream into a segment that
    /// downstream stages can keep splitting.
    fn evaluate_parallel_lazy(
        &self,
        upstream: BoxSegment<In>,
        policy: &SplitPolicy,
    ) -> Result<BoxSegment<Out>> {
        let flags = self
            .flags()
            .combine(upstream.flags())
            .set(Property::Sized);
        let node = self.evaluate_parallel(upstream, policy)?;
        Ok(node_segment(node, flags))
    }
}

/// Segment over a materialized node.
pub fn node_segment<T: Send + 'static>(node: Node<T>, flags: StreamFlags) -> BoxSegment<T> {
    Box::new(CursorSegment::new(Box::new(node.into_cursor()), flags))
}

pub trait TerminalOp<In: Send + 'static>: Send + Sync {
    type Output;

    fn name(&self) -> &'static str;

    /// Op flags folded over the last stage's flags before evaluation.
    fn flags(&self) -> StreamFlags {
        StreamFlags::EMPTY
    }

    fn evaluate_sequential(&self, seg: BoxSegment<In>) -> Result<Self::Output>;

    fn evaluate_parallel(&self, seg: BoxSegment<In>, policy: &SplitPolicy) -> Result<Self::Output>;
}
