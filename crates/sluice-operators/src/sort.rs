//! Stable sort, by natural order or a comparator.

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::slice::ParallelSliceMut;

use sluice_core::error::{Error, Result};
use sluice_core::flags::{Property, StreamFlags};
use sluice_core::sink::{BoxSink, Sink};
use sluice_mem::Node;
use sluice_te::SplitPolicy;

use crate::collect::collect_node;
use crate::segment::BoxSegment;
use crate::traits::{StageOp, StatefulOp};

pub struct SortOp<T, C> {
    cmp: Arc<C>,
    natural: bool,
    _marker: std::marker::PhantomData<fn(&T)>,
}

impl<T: Ord> SortOp<T, fn(&T, &T) -> Ordering> {
    pub fn natural() -> Self {
        Self {
            cmp: Arc::new(<T as Ord>::cmp as fn(&T, &T) -> Ordering),
            natural: true,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, C> SortOp<T, C> {
    pub fn by(cmp: C) -> Self {
        Self {
            cmp: Arc::new(cmp),
            natural: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Already sorted upstream in the same order: nothing to do.
    fn is_noop(&self, upstream: StreamFlags) -> bool {
        self.natural && upstream.is_known(Property::Sorted)
    }
}

impl<T, C> StageOp<T, T> for SortOp<T, C>
where
    T: Send + 'static,
    C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "sorted"
    }

    fn flags(&self) -> StreamFlags {
        if self.natural {
            StreamFlags::IS_ORDERED.union(StreamFlags::IS_SORTED)
        } else {
            StreamFlags::IS_ORDERED.union(StreamFlags::NOT_SORTED)
        }
    }

    fn as_stateful(&self) -> Option<&dyn StatefulOp<T, T>> {
        Some(self)
    }

    fn wrap_sink<'a>(&self, upstream: StreamFlags, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        if self.is_noop(upstream) {
            return down;
        }
        Box::new(SortSink {
            cmp: Arc::clone(&self.cmp),
            buf: Vec::new(),
            down,
        })
    }
}

impl<T, C> StatefulOp<T, T> for SortOp<T, C>
where
    T: Send + 'static,
    C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    fn evaluate_parallel(&self, upstream: BoxSegment<T>, policy: &SplitPolicy) -> Result<Node<T>> {
        let flags = upstream.flags();
        let node = collect_node(upstream, policy)?;
        if self.is_noop(flags) {
            return node.flatten();
        }
        let mut items = node.into_vec()?;
        let cmp = &*self.cmp;
        items.par_sort_by(|a, b| cmp(a, b));
        Ok(Node::from(items))
    }
}

struct SortSink<'a, T, C> {
    cmp: Arc<C>,
    buf: Vec<T>,
    down: BoxSink<'a, T>,
}

impl<T, C> Sink<T> for SortSink<'_, T, C>
where
    T: Send,
    C: Fn(&T, &T) -> Ordering + Send + Sync,
{
    fn begin(&mut self, size: Option<u64>) {
        if let Some(n) = size {
            if let Ok(n) = Error::check_array_size(n) {
                self.buf.reserve(n);
            }
        }
    }

    fn accept(&mut self, value: T) {
        self.buf.push(value)
    }

    fn end(&mut self) {
        let cmp = &*self.cmp;
        self.buf.sort_by(|a, b| cmp(a, b));
        self.down.begin(Some(self.buf.len() as u64));
        for v in self.buf.drain(..) {
            if self.down.cancellation_requested() {
                break;
            }
            self.down.accept(v);
        }
        self.down.end();
    }

    // Never requests upstream cancellation: every element is needed before
    // the first emit.
}
