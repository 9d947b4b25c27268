//! Skip and limit.

use std::sync::Arc;

use sluice_core::error::Result;
use sluice_core::flags::StreamFlags;
use sluice_core::sink::{BoxSink, Sink};
use sluice_mem::Node;
use sluice_te::SplitPolicy;

use crate::collect::{build_leaf, collect_node};
use crate::segment::{BoxSegment, PipedSegment};
use crate::traits::{StageOp, StatefulOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceOp {
    skip: u64,
    limit: Option<u64>,
}

impl SliceOp {
    pub fn new(skip: u64, limit: Option<u64>) -> Self {
        Self { skip, limit }
    }

    /// Output count for an input of `n` elements.
    fn sliced_len(&self, n: u64) -> u64 {
        let rest = n.saturating_sub(self.skip);
        self.limit.map_or(rest, |l| rest.min(l))
    }
}

impl<T: Send + 'static> StageOp<T, T> for SliceOp {
    fn name(&self) -> &'static str {
        "slice"
    }

    fn flags(&self) -> StreamFlags {
        match self.limit {
            Some(_) => StreamFlags::NOT_SIZED.union(StreamFlags::IS_SHORT_CIRCUIT),
            None => StreamFlags::NOT_SIZED,
        }
    }

    fn as_stateful(&self) -> Option<&dyn StatefulOp<T, T>> {
        Some(self)
    }

    fn wrap_sink<'a>(&self, _upstream: StreamFlags, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(SliceSink {
            slice: *self,
            skip: self.skip,
            remaining: self.limit,
            down,
        })
    }
}

impl<T: Send + 'static> StatefulOp<T, T> for SliceOp {
    /// Sized upstreams are collected in parallel and truncated. Otherwise the
    /// position of an element is only known in encounter order, so the slice
    /// runs as one sequential pass over the upstream.
    fn evaluate_parallel(&self, upstream: BoxSegment<T>, policy: &SplitPolicy) -> Result<Node<T>> {
        if let Some(n) = upstream.exact_output_size() {
            let from = self.skip.min(n);
            let to = from + self.sliced_len(n);
            return collect_node(upstream, policy)?.truncate(from, to);
        }
        let op: Arc<dyn StageOp<T, T>> = Arc::new(*self);
        let seg: BoxSegment<T> = Box::new(PipedSegment::new(upstream, op));
        build_leaf(seg)
    }
}

struct SliceSink<'a, T> {
    slice: SliceOp,
    skip: u64,
    remaining: Option<u64>,
    down: BoxSink<'a, T>,
}

impl<T: Send> Sink<T> for SliceSink<'_, T> {
    fn begin(&mut self, size: Option<u64>) {
        self.skip = self.slice.skip;
        self.remaining = self.slice.limit;
        self.down.begin(size.map(|n| self.slice.sliced_len(n)))
    }

    fn accept(&mut self, value: T) {
        if self.skip > 0 {
            self.skip -= 1;
            return;
        }
        match self.remaining {
            Some(0) => {}
            Some(n) => {
                self.remaining = Some(n - 1);
                self.down.accept(value);
            }
            None => self.down.accept(value),
        }
    }

    fn end(&mut self) {
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.remaining == Some(0) || self.down.cancellation_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOp;
    use crate::segment::tests::source;

    #[test]
    fn skip_then_limit() {
        let mut out: Vec<i32> = Vec::new();
        {
            let mut sink = StageOp::<i32, i32>::wrap_sink(&SliceOp::new(2, Some(3)), StreamFlags::INITIAL, Box::new(&mut out));
            sink.begin(Some(10));
            for v in 0..10 {
                if sink.cancellation_requested() {
                    break;
                }
                sink.accept(v);
            }
            sink.end();
        }
        assert_eq!(out, vec![2, 3, 4]);
    }

    #[test]
    fn limit_is_short_circuit() {
        let flags = StageOp::<i32, i32>::flags(&SliceOp::new(0, Some(1)));
        assert!(flags.is_known(sluice_core::flags::Property::ShortCircuit));
    }

    #[test]
    fn parallel_sized_truncates() {
        let node = StatefulOp::<i32, i32>::evaluate_parallel(&SliceOp::new(10, Some(5)), source((0..1_000).collect()), &SplitPolicy::new(8))
            .unwrap();
        assert_eq!(node.into_vec().unwrap(), vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn parallel_unsized_runs_in_encounter_order() {
        let seg: BoxSegment<i32> = Box::new(PipedSegment::<i32, i32>::new(
            source((0..1_000).collect()),
            Arc::new(FilterOp::new(|x: &i32| x % 2 == 1)),
        ));
        let node = StatefulOp::<i32, i32>::evaluate_parallel(&SliceOp::new(1, Some(3)), seg, &SplitPolicy::new(8)).unwrap();
        assert_eq!(node.into_vec().unwrap(), vec![3, 5, 7]);
    }

    #[test]
    fn skip_past_end_is_empty() {
        let node = StatefulOp::<i32, i32>::evaluate_parallel(&SliceOp::new(50, None), source((0..10).collect()), &SplitPolicy::new(8))
            .unwrap();
        assert!(node.is_empty());
    }
}
