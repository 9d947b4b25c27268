//! Side-effecting terminals.

use sluice_core::error::Result;
use sluice_core::flags::{Property, StreamFlags};
use sluice_core::sink::FnSink;
use sluice_te::{run, run_ordered, OrderedSpec, SplitPolicy, TaskSpec};

use crate::segment::{copy_into, BoxSegment};
use crate::traits::TerminalOp;

/// Apply `f` to every element. In parallel the calls happen in no particular
/// order, possibly concurrently.
pub struct ForEachOp<F> {
    f: F,
}

impl<F> ForEachOp<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }

    fn leaf<T: Send + 'static>(&self, seg: BoxSegment<T>)
    where
        F: Fn(T) + Send + Sync,
    {
        copy_into(seg, &mut FnSink(|v| (self.f)(v)));
    }
}

impl<T, F> TerminalOp<T> for ForEachOp<F>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync,
{
    type Output = ();

    fn name(&self) -> &'static str {
        "for_each"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::NOT_ORDERED
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<()> {
        self.leaf(seg);
        Ok(())
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<()> {
        let spec = TaskSpec {
            leaf: |s: BoxSegment<T>| self.leaf(s),
            combine: |(), ()| (),
        };
        run(seg, policy, &spec);
        Ok(())
    }
}

/// Apply `f` to every element in encounter order. In parallel, calls never
/// overlap and follow encounter order whenever the upstream is ordered.
pub struct ForEachOrderedOp<F> {
    f: F,
}

impl<F> ForEachOrderedOp<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> TerminalOp<T> for ForEachOrderedOp<F>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync,
{
    type Output = ();

    fn name(&self) -> &'static str {
        "for_each_ordered"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<()> {
        copy_into(seg, &mut FnSink(|v| (self.f)(v)));
        Ok(())
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<()> {
        if seg.flags().is_known_false(Property::Ordered) {
            // No order to respect; only serialize the calls.
            let lock = parking_lot::Mutex::new(());
            let spec = TaskSpec {
                leaf: |s: BoxSegment<T>| {
                    let mut buf = Vec::new();
                    copy_into(s, &mut buf);
                    let _guard = lock.lock();
                    buf.into_iter().for_each(&self.f);
                },
                combine: |(), ()| (),
            };
            run(seg, policy, &spec);
            return Ok(());
        }
        let spec = OrderedSpec {
            emit_direct: |s: BoxSegment<T>| copy_into(s, &mut FnSink(|v| (self.f)(v))),
            buffer: |s: BoxSegment<T>| {
                let mut buf = Vec::new();
                copy_into(s, &mut buf);
                buf
            },
            emit_buffer: |buf: Vec<T>| buf.into_iter().for_each(&self.f),
        };
        run_ordered(seg, policy, &spec);
        Ok(())
    }
}
