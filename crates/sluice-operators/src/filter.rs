//! Predicate filter.

use std::sync::Arc;

use sluice_core::flags::StreamFlags;
use sluice_core::sink::{BoxSink, Sink};

use crate::traits::StageOp;

pub struct FilterOp<P> {
    pred: Arc<P>,
}

impl<P> FilterOp<P> {
    pub fn new(pred: P) -> Self {
        Self {
            pred: Arc::new(pred),
        }
    }
}

impl<T, P> StageOp<T, T> for FilterOp<P>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "filter"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::NOT_SIZED
    }

    fn wrap_sink<'a>(&self, _upstream: StreamFlags, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(FilterSink {
            pred: Arc::clone(&self.pred),
            down,
        })
    }
}

struct FilterSink<'a, T, P> {
    pred: Arc<P>,
    down: BoxSink<'a, T>,
}

impl<T, P> Sink<T> for FilterSink<'_, T, P>
where
    P: Fn(&T) -> bool + Send + Sync,
{
    fn begin(&mut self, _size: Option<u64>) {
        self.down.begin(None)
    }

    fn accept(&mut self, value: T) {
        if (self.pred)(&value) {
            self.down.accept(value)
        }
    }

    fn end(&mut self) {
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}
