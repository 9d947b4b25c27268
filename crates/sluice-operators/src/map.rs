//! Element-wise transform.

use std::marker::PhantomData;
use std::sync::Arc;

use sluice_core::flags::StreamFlags;
use sluice_core::sink::{BoxSink, Sink};

use crate::traits::StageOp;

pub struct MapOp<In, Out, F> {
    f: Arc<F>,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out, F> MapOp<In, Out, F> {
    pub fn new(f: F) -> Self {
        Self {
            f: Arc::new(f),
            _marker: PhantomData,
        }
    }
}

impl<In, Out, F> StageOp<In, Out> for MapOp<In, Out, F>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: Fn(In) -> Out + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "map"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::NOT_SORTED.union(StreamFlags::NOT_DISTINCT)
    }

    fn wrap_sink<'a>(&self, _upstream: StreamFlags, down: BoxSink<'a, Out>) -> BoxSink<'a, In> {
        Box::new(MapSink {
            f: Arc::clone(&self.f),
            down,
        })
    }
}

struct MapSink<'a, Out, F> {
    f: Arc<F>,
    down: BoxSink<'a, Out>,
}

impl<In, Out, F> Sink<In> for MapSink<'_, Out, F>
where
    F: Fn(In) -> Out + Send + Sync,
{
    fn begin(&mut self, size: Option<u64>) {
        self.down.begin(size)
    }

    fn accept(&mut self, value: In) {
        self.down.accept((self.f)(value))
    }

    fn end(&mut self) {
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}
