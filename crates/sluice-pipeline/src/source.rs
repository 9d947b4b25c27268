//! Lazily opened segment sources.
//!
//! A pipeline holds the recipe for its last stage's segment. Nothing is
//! opened (no cursor created, no stateful stage evaluated) until a terminal
//! runs.

use std::sync::Arc;

use sluice_core::config::EngineConfig;
use sluice_core::error::Result;
use sluice_core::flags::StreamFlags;
use sluice_cursor::{BoxCursor, ConcatCursor};
use sluice_operators::{BoxSegment, CursorSegment, PipedSegment, StageOp, WrappingCursor};
use sluice_te::SplitPolicy;

use crate::context::ExecContext;

pub(crate) type BoxSource<T> = Box<dyn SegmentSource<T>>;

pub(crate) trait SegmentSource<T>: Send {
    fn open(self: Box<Self>, ctx: &ExecContext, policy: &SplitPolicy) -> Result<BoxSegment<T>>;
}

/// Source stage backed by a cursor supplier.
pub(crate) struct CursorSource<F> {
    supplier: F,
    flags: StreamFlags,
}

impl<F> CursorSource<F> {
    pub(crate) fn new(supplier: F, flags: StreamFlags) -> Self {
        Self { supplier, flags }
    }
}

impl<T, F> SegmentSource<T> for CursorSource<F>
where
    T: Send + 'static,
    F: FnOnce(&EngineConfig) -> Result<BoxCursor<T>> + Send,
{
    fn open(self: Box<Self>, ctx: &ExecContext, _policy: &SplitPolicy) -> Result<BoxSegment<T>> {
        let cursor = (self.supplier)(ctx.config())?;
        Ok(Box::new(CursorSegment::new(cursor, self.flags)))
    }
}

/// An intermediate stage on top of its upstream's source.
pub(crate) struct StageSource<In, Out> {
    upstream: BoxSource<In>,
    op: Arc<dyn StageOp<In, Out>>,
}

impl<In, Out> StageSource<In, Out> {
    pub(crate) fn new(upstream: BoxSource<In>, op: Arc<dyn StageOp<In, Out>>) -> Self {
        Self { upstream, op }
    }
}

impl<In: Send + 'static, Out: Send + 'static> SegmentSource<Out> for StageSource<In, Out> {
    fn open(self: Box<Self>, ctx: &ExecContext, policy: &SplitPolicy) -> Result<BoxSegment<Out>> {
        let upstream = self.upstream.open(ctx, policy)?;
        if ctx.is_parallel() {
            if let Some(op) = self.op.as_stateful() {
                tracing::trace!(stage = op.name(), "materializing stateful stage");
                return op.evaluate_parallel_lazy(upstream, policy);
            }
        }
        Ok(Box::new(PipedSegment::new(upstream, self.op)))
    }
}

/// Two pipelines traversed one after the other.
pub(crate) struct ConcatSource<T> {
    first: BoxSource<T>,
    second: BoxSource<T>,
    flags: StreamFlags,
}

impl<T> ConcatSource<T> {
    pub(crate) fn new(first: BoxSource<T>, second: BoxSource<T>, flags: StreamFlags) -> Self {
        Self {
            first,
            second,
            flags,
        }
    }
}

impl<T: Send + 'static> SegmentSource<T> for ConcatSource<T> {
    fn open(self: Box<Self>, ctx: &ExecContext, policy: &SplitPolicy) -> Result<BoxSegment<T>> {
        let first: BoxCursor<T> = Box::new(WrappingCursor::new(self.first.open(ctx, policy)?));
        let second: BoxCursor<T> = Box::new(WrappingCursor::new(self.second.open(ctx, policy)?));
        Ok(Box::new(CursorSegment::new(
            Box::new(ConcatCursor::new(first, second)),
            self.flags,
        )))
    }
}
