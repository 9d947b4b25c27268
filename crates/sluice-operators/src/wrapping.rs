//! Turn a segment back into a cursor.
//!
//! Nothing runs until the first element is requested. From then on each
//! request steps the segment's source until the sink chain has produced at
//! least one element (or finished). Before traversal starts the cursor splits
//! by splitting the segment; afterwards it no longer splits.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use sluice_core::flags::{Characteristics, Property};
use sluice_core::sink::Sink;
use sluice_cursor::{BoxCursor, Cursor, UNKNOWN_SIZE};

use crate::segment::{BoxSegment, Stepper};

struct BufferSink<T> {
    buf: Arc<Mutex<VecDeque<T>>>,
}

impl<T: Send> Sink<T> for BufferSink<T> {
    fn accept(&mut self, value: T) {
        self.buf.lock().push_back(value)
    }
}

enum State<T> {
    Pending(BoxSegment<T>),
    Running {
        stepper: Box<dyn Stepper>,
        buf: Arc<Mutex<VecDeque<T>>>,
        finished: bool,
    },
}

pub struct WrappingCursor<T> {
    state: State<T>,
    estimate: u64,
    characteristics: Characteristics,
}

impl<T: Send + 'static> WrappingCursor<T> {
    pub fn new(seg: BoxSegment<T>) -> Self {
        let flags = seg.flags();
        let exact = seg.exact_output_size();
        let mut characteristics = flags.to_characteristics();
        if exact.is_none() {
            characteristics.remove(Characteristics::SIZED);
        } else {
            characteristics |= Characteristics::SIZED;
        }
        if !flags.is_known(Property::Sized) {
            characteristics.remove(Characteristics::SUBSIZED);
        }
        Self {
            estimate: exact.unwrap_or_else(|| seg.estimate_size()),
            state: State::Pending(seg),
            characteristics,
        }
    }

    fn start(&mut self) {
        let State::Pending(_) = self.state else {
            return;
        };
        let buf = Arc::new(Mutex::new(VecDeque::new()));
        let placeholder = State::Running {
            stepper: Box::new(Finished),
            buf: Arc::clone(&buf),
            finished: true,
        };
        if let State::Pending(seg) = std::mem::replace(&mut self.state, placeholder) {
            let size = seg.exact_output_size();
            let mut stepper = seg.into_stepper(Box::new(BufferSink {
                buf: Arc::clone(&buf),
            }));
            stepper.begin(size);
            self.state = State::Running {
                stepper,
                buf,
                finished: false,
            };
        }
    }
}

/// Stepper of an already finished traversal.
struct Finished;

impl Stepper for Finished {
    fn begin(&mut self, _size: Option<u64>) {}
    fn step(&mut self) -> bool {
        false
    }
    fn drain(&mut self) {}
    fn end(&mut self) {}
    fn cancellation_requested(&self) -> bool {
        true
    }
}

impl<T: Send + 'static> Cursor<T> for WrappingCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        self.start();
        let State::Running {
            stepper,
            buf,
            finished,
        } = &mut self.state
        else {
            return false;
        };
        loop {
            let next = buf.lock().pop_front();
            if let Some(v) = next {
                if self.estimate != UNKNOWN_SIZE {
                    self.estimate = self.estimate.saturating_sub(1);
                }
                action(v);
                return true;
            }
            if *finished {
                return false;
            }
            if stepper.cancellation_requested() || !stepper.step() {
                // `end` may flush buffered elements (e.g. a sort).
                stepper.end();
                *finished = true;
            }
        }
    }

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        let State::Pending(seg) = &mut self.state else {
            return None;
        };
        let prefix = seg.try_split()?;
        let prefix = WrappingCursor::new(prefix);
        let rest_exact = seg.exact_output_size();
        self.estimate = rest_exact.unwrap_or_else(|| seg.estimate_size());
        Some(Box::new(prefix))
    }

    fn estimate_size(&self) -> u64 {
        match &self.state {
            State::Running { buf, finished: true, .. } => buf.lock().len() as u64,
            _ => self.estimate,
        }
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }
}
