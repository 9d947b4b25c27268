//! Segments: a piece of a source cursor plus the stage chain applied to it.
//!
//! A segment for stage `S` produces the elements `S` would emit for its
//! piece of the source. Splitting a segment splits the underlying cursor and
//! shares the (immutable) stage chain, so every piece of a parallel task tree
//! runs the same sink chain over its own slice of the input.

use std::marker::PhantomData;
use std::sync::Arc;

use sluice_core::flags::{Property, StreamFlags};
use sluice_core::sink::{BoxSink, Sink};
use sluice_cursor::BoxCursor;
use sluice_te::Splittable;

use crate::traits::StageOp;

pub type BoxSegment<T> = Box<dyn Segment<T>>;

/// Drives elements from a segment's source into the sink chain built for it.
pub trait Stepper: Send {
    fn begin(&mut self, size: Option<u64>);
    /// Push one source element through the chain; false once exhausted.
    fn step(&mut self) -> bool;
    /// Push every remaining source element.
    fn drain(&mut self);
    fn end(&mut self);
    fn cancellation_requested(&self) -> bool;
}

pub trait Segment<T>: Send {
    /// Combined flags of the stage this segment produces.
    fn flags(&self) -> StreamFlags;

    /// Estimated source elements remaining in this piece.
    fn estimate_size(&self) -> u64;

    /// Exact number of output elements, when the chain preserves size and the
    /// source piece knows its size.
    fn exact_output_size(&self) -> Option<u64>;

    fn try_split(&mut self) -> Option<BoxSegment<T>>;

    /// Build the sink chain in front of `sink` and return the driver.
    fn into_stepper<'a>(self: Box<Self>, sink: BoxSink<'a, T>) -> Box<dyn Stepper + 'a>;
}

impl<T: 'static> Splittable for BoxSegment<T> {
    fn estimate_size(&self) -> u64 {
        (**self).estimate_size()
    }

    fn try_split(&mut self) -> Option<Self> {
        (**self).try_split()
    }
}

/// Source piece: a cursor and the source stage's flags.
pub struct CursorSegment<T> {
    cursor: BoxCursor<T>,
    flags: StreamFlags,
}

impl<T> CursorSegment<T> {
    pub fn new(cursor: BoxCursor<T>, flags: StreamFlags) -> Self {
        Self { cursor, flags }
    }
}

impl<T: Send + 'static> Segment<T> for CursorSegment<T> {
    fn flags(&self) -> StreamFlags {
        self.flags
    }

    fn estimate_size(&self) -> u64 {
        self.cursor.estimate_size()
    }

    fn exact_output_size(&self) -> Option<u64> {
        self.cursor.exact_size_if_known()
    }

    fn try_split(&mut self) -> Option<BoxSegment<T>> {
        let prefix = self.cursor.try_split()?;
        Some(Box::new(CursorSegment::new(prefix, self.flags)))
    }

    fn into_stepper<'a>(self: Box<Self>, sink: BoxSink<'a, T>) -> Box<dyn Stepper + 'a> {
        Box::new(CursorStepper {
            cursor: self.cursor,
            sink,
        })
    }
}

struct CursorStepper<'a, T> {
    cursor: BoxCursor<T>,
    sink: BoxSink<'a, T>,
}

impl<T> Stepper for CursorStepper<'_, T> {
    fn begin(&mut self, size: Option<u64>) {
        self.sink.begin(size)
    }

    fn step(&mut self) -> bool {
        let sink = &mut self.sink;
        self.cursor.try_advance(&mut |v| sink.accept(v))
    }

    fn drain(&mut self) {
        let sink = &mut self.sink;
        self.cursor.for_each_remaining(&mut |v| sink.accept(v))
    }

    fn end(&mut self) {
        self.sink.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.sink.cancellation_requested()
    }
}

/// An intermediate stage applied on top of its upstream segment.
pub struct PipedSegment<In, Out> {
    inner: BoxSegment<In>,
    op: Arc<dyn StageOp<In, Out>>,
    flags: StreamFlags,
}

impl<In: Send + 'static, Out: Send + 'static> PipedSegment<In, Out> {
    pub fn new(inner: BoxSegment<In>, op: Arc<dyn StageOp<In, Out>>) -> Self {
        let flags = op.flags().combine(inner.flags());
        Self { inner, op, flags }
    }
}

impl<In: Send + 'static, Out: Send + 'static> Segment<Out> for PipedSegment<In, Out> {
    fn flags(&self) -> StreamFlags {
        self.flags
    }

    fn estimate_size(&self) -> u64 {
        self.inner.estimate_size()
    }

    fn exact_output_size(&self) -> Option<u64> {
        if self.op.flags().mentions(Property::Sized) {
            None
        } else {
            self.inner.exact_output_size()
        }
    }

    fn try_split(&mut self) -> Option<BoxSegment<Out>> {
        let prefix = self.inner.try_split()?;
        Some(Box::new(PipedSegment {
            inner: prefix,
            op: Arc::clone(&self.op),
            flags: self.flags,
        }))
    }

    fn into_stepper<'a>(self: Box<Self>, sink: BoxSink<'a, Out>) -> Box<dyn Stepper + 'a> {
        let upstream = self.inner.flags();
        let wrapped = self.op.wrap_sink(upstream, sink);
        self.inner.into_stepper(wrapped)
    }
}

/// Overlays extra op flags (typically a terminal's) on a segment.
pub struct FlaggedSegment<T> {
    inner: BoxSegment<T>,
    flags: StreamFlags,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> FlaggedSegment<T> {
    pub fn wrap(inner: BoxSegment<T>, op_flags: StreamFlags) -> BoxSegment<T> {
        if op_flags == StreamFlags::EMPTY {
            return inner;
        }
        let flags = op_flags.combine(inner.flags());
        Box::new(FlaggedSegment {
            inner,
            flags,
            _marker: PhantomData,
        })
    }
}

impl<T: Send + 'static> Segment<T> for FlaggedSegment<T> {
    fn flags(&self) -> StreamFlags {
        self.flags
    }

    fn estimate_size(&self) -> u64 {
        self.inner.estimate_size()
    }

    fn exact_output_size(&self) -> Option<u64> {
        self.inner.exact_output_size()
    }

    fn try_split(&mut self) -> Option<BoxSegment<T>> {
        let prefix = self.inner.try_split()?;
        Some(Box::new(FlaggedSegment {
            inner: prefix,
            flags: self.flags,
            _marker: PhantomData,
        }))
    }

    fn into_stepper<'a>(self: Box<Self>, sink: BoxSink<'a, T>) -> Box<dyn Stepper + 'a> {
        self.inner.into_stepper(sink)
    }
}

/// Push every element of `seg` into `sink` as one begin/accept/end pass.
///
/// Short-circuiting chains are stepped one source element at a time and
/// stop as soon as the sink chain requests cancellation.
pub fn copy_into<T: Send + 'static>(seg: BoxSegment<T>, sink: &mut dyn Sink<T>) {
    let short = seg.flags().is_known(Property::ShortCircuit);
    let size = seg.exact_output_size();
    let mut stepper = seg.into_stepper(Box::new(sink));
    stepper.begin(size);
    if short {
        while !stepper.cancellation_requested() && stepper.step() {}
    } else {
        stepper.drain();
    }
    stepper.end();
}

/// Like [`copy_into`], additionally stopping when `cancel` returns true.
pub fn copy_into_with_cancel<T: Send + 'static>(
    seg: BoxSegment<T>,
    sink: &mut dyn Sink<T>,
    cancel: &dyn Fn() -> bool,
) {
    let size = seg.exact_output_size();
    let mut stepper = seg.into_stepper(Box::new(sink));
    stepper.begin(size);
    while !cancel() && !stepper.cancellation_requested() && stepper.step() {}
    stepper.end();
}
