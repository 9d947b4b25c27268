//! Observe elements without changing the stream.

use std::sync::Arc;

use sluice_core::flags::StreamFlags;
use sluice_core::sink::{BoxSink, Sink};

use crate::traits::StageOp;

pub struct PeekOp<F> {
    f: Arc<F>,
}

impl<F> PeekOp<F> {
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

impl<T, F> StageOp<T, T> for PeekOp<F>
where
    T: Send + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "peek"
    }

    fn flags(&self) -> StreamFlags {
        StreamFlags::EMPTY
    }

    fn wrap_sink<'a>(&self, _upstream: StreamFlags, down: BoxSink<'a, T>) -> BoxSink<'a, T> {
        Box::new(PeekSink {
            f: Arc::clone(&self.f),
            down,
        })
    }
}

struct PeekSink<'a, T, F> {
    f: Arc<F>,
    down: BoxSink<'a, T>,
}

impl<T, F> Sink<T> for PeekSink<'_, T, F>
where
    F: Fn(&T) + Send + Sync,
{
    fn begin(&mut self, size: Option<u64>) {
        self.down.begin(size)
    }

    fn accept(&mut self, value: T) {
        (self.f)(&value);
        self.down.accept(value)
    }

    fn end(&mut self) {
        self.down.end()
    }

    fn cancellation_requested(&self) -> bool {
        self.down.cancellation_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use crate::segment::copy_into;
    use crate::segment::tests::source;
    use crate::segment::{FlaggedSegment, PipedSegment};

    #[test]
    fn peek_sees_every_element_and_passes_it_on() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let op = PeekOp::new(move |v: &i32| s.lock().push(*v));
        let mut out: Vec<i32> = Vec::new();
        {
            let mut sink = StageOp::<i32, i32>::wrap_sink(&op, StreamFlags::INITIAL, Box::new(&mut out));
            sink.begin(Some(3));
            for v in [7, 8, 9] {
                sink.accept(v);
            }
            sink.end();
        }
        assert_eq!(out, vec![7, 8, 9]);
        assert_eq!(*seen.lock(), vec![7, 8, 9]);
    }

    struct TakeTwo {
        items: Vec<i32>,
    }

    impl Sink<i32> for TakeTwo {
        fn accept(&mut self, v: i32) {
            self.items.push(v);
        }

        fn cancellation_requested(&self) -> bool {
            self.items.len() >= 2
        }
    }

    #[test]
    fn peek_forwards_downstream_cancellation() {
        let seen = Arc::new(Mutex::new(0usize));
        let s = Arc::clone(&seen);
        let op: Arc<dyn StageOp<i32, i32>> = Arc::new(PeekOp::new(move |_: &i32| *s.lock() += 1));
        let seg = FlaggedSegment::wrap(
            Box::new(PipedSegment::new(source((0..100).collect()), op)),
            StreamFlags::IS_SHORT_CIRCUIT,
        );
        let mut sink = TakeTwo { items: Vec::new() };
        copy_into(seg, &mut sink);
        assert_eq!(sink.items, vec![0, 1]);
        assert_eq!(*seen.lock(), 2);
    }
}
