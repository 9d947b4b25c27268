//! One-to-many transform.

use std::marker::PhantomData;
use std::sync::Arc;

use sluice_core::flags::StreamFlags;
use sluice_core::sink::{BoxSink, Sink};

use crate::traits::StageOp;

pub struct FlatMapOp<In, I, F> {
    f: Arc<F>,
    _marker: PhantomData<fn(In) -> I>,
}

impl<In, I, F> FlatMapOp<In, I, F> {
    pub fn new(f: F) -> Self {
        Self {
            f: Arc::new(f),
            _marker: PhantomData,
        }
    }
}

impl<In, I, F> StageOp<In, I::Item> for FlatMapOp<In, I, F>
where
    In: Send + 'static,
    I: IntoIterator + 'static,
    I::Item: Send + 'static,
    F: Fn(In) -> I + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "flat_map"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::NOT_SORTED
            .union(StreamFlags::NOT_DISTINCT)
            .union(StreamFlags::NOT_SIZED)
    }

    fn wrap_sink<'a>(&self, _upstream: StreamFlags, down: BoxSink<'a, I::Item>) -> BoxSink<'a, In> {
        Box::new(FlatMapSink::<'a, I, F> {
            f: Arc::clone(&self.f),
            down,
        })
    }
}

struct FlatMapSink<'a, I: IntoIterator, F> {
    f: Arc<F>,
    down: BoxSink<'a, I::Item>,
}

impl<In, I, F> Sink<In> for FlatMapSink<'_, I, F>
where
    I: IntoIterator,
    F: Fn(In) -> I + Send + Sync,
{
    fn begin(&mut self, _size: Option<u64>) {
        self.down.begin(None)
    }

    fn accept(&mut self, value: In) {
        for v in (self.f)(value) {
            // A short-circuiting downstream may stop in the middle of one
            // expansion.
            if self.down.cancellation_requested() {
                break;
            }
            self.down.accept(v);
        }
    }

    fn end(&mut self) {
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}
