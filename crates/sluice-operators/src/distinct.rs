//! Remove duplicate elements.
//!
//! Sequential strategy depends on what upstream already guarantees:
//! distinct upstream passes through, sorted upstream only compares with the
//! previous element, anything else tracks a seen set. In parallel, an
//! ordered upstream keeps the first occurrence of each element in encounter
//! order; an unordered upstream shares one concurrent seen set between all
//! tasks.
//!
//! `Option<T>` elements work unchanged: `None` is an ordinary key.

use std::collections::HashSet;
use std::hash::Hash;

use dashmap::DashSet;

use sluice_core::error::Result;
use sluice_core::flags::{Property, StreamFlags};
use sluice_core::sink::{BoxSink, Sink};
use sluice_cursor::DistinctCursor;
use sluice_mem::{Node, NodeBuilder};
use sluice_te::{run, SplitPolicy, TaskSpec};

use crate::collect::collect_node;
use crate::segment::{copy_into, BoxSegment, CursorSegment, FlaggedSegment};
use crate::traits::{StageOp, StatefulOp};
use crate::wrapping::WrappingCursor;

#[derive(Debug, Default, Clone, Copy)]
pub struct DistinctOp;

impl<T> StageOp<T, T> for DistinctOp
where
    T: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::IS_DISTINCT.union(StreamFlags::NOT_SIZED)
    }

    fn as_stateful(&self) -> Option<&dyn StatefulOp<T, T>> {
        Some(self)
    }

    fn wrap_sink<'a>(&self, upstream: StreamFlags, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        if upstream.is_known(Property::Distinct) {
            down
        } else if upstream.is_known(Property::Sorted) {
            Box::new(SortedDistinctSink { last: None, down })
        } else {
            Box::new(HashDistinctSink {
                seen: HashSet::new(),
                down,
            })
        }
    }
}

impl<T> StatefulOp<T, T> for DistinctOp
where
    T: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn evaluate_parallel(&self, upstream: BoxSegment<T>, policy: &SplitPolicy) -> Result<Node<T>> {
        let flags = upstream.flags();
        if flags.is_known(Property::Distinct) {
            return collect_node(upstream, policy);
        }
        if flags.is_known(Property::Ordered) {
            let mut seen = HashSet::new();
            let mut items = collect_node(upstream, policy)?.into_vec()?;
            items.retain(|v| seen.insert(v.clone()));
            return Ok(Node::from(items));
        }
        let seen: DashSet<T> = DashSet::new();
        let spec = TaskSpec {
            leaf: |seg: BoxSegment<T>| {
                let mut builder = NodeBuilder::new();
                {
                    let mut sink = SharedDistinctSink {
                        seen: &seen,
                        down: &mut builder,
                    };
                    copy_into(seg, &mut sink);
                }
                builder.build()
            },
            combine: |l: Result<Node<T>>, r: Result<Node<T>>| Ok(Node::concat(l?, r?)),
        };
        run(upstream, policy, &spec)
    }

    fn evaluate_parallel_lazy(
        &self,
        upstream: BoxSegment<T>,
        policy: &SplitPolicy,
    ) -> Result<BoxSegment<T>> {
        let flags = upstream.flags();
        let out_flags = StageOp::<T, T>::flags(self).combine(flags);
        if flags.is_known(Property::Distinct) {
            return Ok(FlaggedSegment::wrap(upstream, StageOp::<T, T>::flags(self)));
        }
        if flags.is_known(Property::Ordered) {
            let node = StatefulOp::<T, T>::evaluate_parallel(self, upstream, policy)?;
            return Ok(crate::traits::node_segment(node, out_flags.set(Property::Sized)));
        }
        let cursor = DistinctCursor::new(Box::new(WrappingCursor::new(upstream)));
        Ok(Box::new(CursorSegment::new(Box::new(cursor), out_flags)))
    }
}

struct SortedDistinctSink<'a, T> {
    last: Option<T>,
    down: BoxSink<'a, T>,
}

impl<T: PartialEq + Clone + Send> Sink<T> for SortedDistinctSink<'_, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.last = None;
        self.down.begin(None)
    }

    fn accept(&mut self, value: T) {
        if self.last.as_ref() != Some(&value) {
            self.last = Some(value.clone());
            self.down.accept(value);
        }
    }

    fn end(&mut self) {
        self.last = None;
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}

struct HashDistinctSink<'a, T> {
    seen: HashSet<T>,
    down: BoxSink<'a, T>,
}

impl<T: Hash + Eq + Clone + Send> Sink<T> for HashDistinctSink<'_, T> {
    fn begin(&mut self, _size: Option<u64>) {
        self.down.begin(None)
    }

    fn accept(&mut self, value: T) {
        if self.seen.insert(value.clone()) {
            self.down.accept(value);
        }
    }

    fn end(&mut self) {
        self.seen.clear();
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}

/// Seen set shared by every leaf of one parallel evaluation.
struct SharedDistinctSink<'s, T: Hash + Eq, S> {
    seen: &'s DashSet<T>,
    down: S,
}

impl<T, S> Sink<T> for SharedDistinctSink<'_, T, S>
where
    T: Hash + Eq + Clone + Send + Sync,
    S: Sink<T>,
{
    fn begin(&mut self, _size: Option<u64>) {
        self.down.begin(None)
    }

    fn accept(&mut self, value: T) {
        if self.seen.insert(value.clone()) {
            self.down.accept(value);
        }
    }

    fn end(&mut self) {
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}
