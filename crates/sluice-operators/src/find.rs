//! find_first / find_any.

use sluice_core::error::Result;
use sluice_core::flags::{Property, StreamFlags};
use sluice_core::sink::Sink;
use sluice_te::{run_short_circuit, ShortCircuitSpec, SplitPolicy};

use crate::segment::{copy_into, copy_into_with_cancel, BoxSegment, FlaggedSegment};
use crate::traits::TerminalOp;

struct FindSink<T> {
    value: Option<T>,
}

impl<T: Send> Sink<T> for FindSink<T> {
    fn accept(&mut self, value: T) {
        if self.value.is_none() {
            self.value = Some(value);
        }
    }

    fn cancellation_requested(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOp {
    first: bool,
}

impl FindOp {
    pub fn first() -> Self {
        Self { first: true }
    }

    pub fn any() -> Self {
        Self { first: false }
    }
}

impl<T: Send + Sync + 'static> TerminalOp<T> for FindOp {
    type Output = Option<T>;

    fn name(&self) -> &'static str {
        if self.first {
            "find_first"
        } else {
            "find_any"
        }
    }

    fn flags(&self) -> StreamFlags {
        if self.first {
            StreamFlags::IS_SHORT_CIRCUIT
        } else {
            StreamFlags::IS_SHORT_CIRCUIT.union(StreamFlags::NOT_ORDERED)
        }
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<Option<T>> {
        let mut sink = FindSink { value: None };
        copy_into(FlaggedSegment::wrap(seg, StreamFlags::IS_SHORT_CIRCUIT), &mut sink);
        Ok(sink.value)
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<Option<T>> {
        // Without an encounter order any match is a first match.
        let find_first = self.first && !seg.flags().is_known_false(Property::Ordered);
        let spec = ShortCircuitSpec {
            leaf: |s: BoxSegment<T>, stop: &dyn Fn() -> bool| {
                let mut sink = FindSink { value: None };
                copy_into_with_cancel(s, &mut sink, stop);
                sink.value
            },
            find_first,
        };
        Ok(run_short_circuit(seg, policy, &spec))
    }
}
