//! any_match / all_match / none_match.

use std::sync::Arc;

use sluice_core::error::Result;
use sluice_core::flags::StreamFlags;
use sluice_core::sink::Sink;
use sluice_te::{run_short_circuit, ShortCircuitSpec, SplitPolicy};

use crate::segment::{copy_into, copy_into_with_cancel, BoxSegment, FlaggedSegment};
use crate::traits::TerminalOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Any,
    All,
    None,
}

impl MatchKind {
    /// Predicate outcome that decides the answer on its own.
    fn stop_on(self) -> bool {
        match self {
            MatchKind::Any | MatchKind::None => true,
            MatchKind::All => false,
        }
    }

    /// Answer once a deciding element was seen.
    fn decided(self) -> bool {
        matches!(self, MatchKind::Any)
    }
}

struct MatchSink<'p, P> {
    pred: &'p P,
    stop_on: bool,
    hit: bool,
}

impl<T, P> Sink<T> for MatchSink<'_, P>
where
    P: Fn(&T) -> bool + Sync,
{
    fn accept(&mut self, value: T) {
        if !self.hit && (self.pred)(&value) == self.stop_on {
            self.hit = true;
        }
    }

    fn cancellation_requested(&self) -> bool {
        self.hit
    }
}

pub struct MatchOp<P> {
    kind: MatchKind,
    pred: Arc<P>,
}

impl<P> MatchOp<P> {
    pub fn new(kind: MatchKind, pred: P) -> Self {
        Self {
            kind,
            pred: Arc::new(pred),
        }
    }

    fn answer(&self, hit: bool) -> bool {
        if hit {
            self.kind.decided()
        } else {
            !self.kind.decided()
        }
    }
}

impl<T, P> TerminalOp<T> for MatchOp<P>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync,
{
    type Output = bool;

    fn name(&self) -> &'static str {
        match self.kind {
            MatchKind::Any => "any_match",
            MatchKind::All => "all_match",
            MatchKind::None => "none_match",
        }
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::IS_SHORT_CIRCUIT.union(StreamFlags::NOT_ORDERED)
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<bool> {
        let mut sink = MatchSink {
            pred: &*self.pred,
            stop_on: self.kind.stop_on(),
            hit: false,
        };
        copy_into(FlaggedSegment::wrap(seg, StreamFlags::IS_SHORT_CIRCUIT), &mut sink);
        Ok(self.answer(sink.hit))
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<bool> {
        let spec = ShortCircuitSpec {
            leaf: |s: BoxSegment<T>, stop: &dyn Fn() -> bool| {
                let mut sink = MatchSink {
                    pred: &*self.pred,
                    stop_on: self.kind.stop_on(),
                    hit: false,
                };
                copy_into_with_cancel(s, &mut sink, stop);
                sink.hit.then_some(())
            },
            find_first: false,
        };
        Ok(self.answer(run_short_circuit(seg, policy, &spec).is_some()))
    }
}
