//! Push-based consumer protocol.
//!
//! A traversal pass calls `begin` once, `accept` zero or more times and `end`
//! once. Chained sinks own their downstream sink and forward `begin`/`end`,
//! adjusting the size hint when they change the element count.

/// A consumer of one traversal pass.
pub trait Sink<T>: Send {
    /// Called once before any element. `size` is the exact count when known.
    fn begin(&mut self, size: Option<u64>) {
        let _ = size;
    }

    fn accept(&mut self, value: T);

    /// Called once after the last element.
    fn end(&mut self) {}

    /// Short-circuiting drivers stop pushing once this returns true.
    fn cancellation_requested(&self) -> bool {
        false
    }
}

/// Owned, type-erased sink borrowing from `'a`.
pub type BoxSink<'a, T> = Box<dyn Sink<T> + 'a>;

impl<T, S: Sink<T> + ?Sized> Sink<T> for &mut S {
    fn begin(&mut self, size: Option<u64>) {
        (**self).begin(size)
    }
    fn accept(&mut self, value: T) {
        (**self).accept(value)
    }
    fn end(&mut self) {
        (**self).end()
    }
    fn cancellation_requested(&self) -> bool {
        (**self).cancellation_requested()
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for Box<S> {
    fn begin(&mut self, size: Option<u64>) {
        (**self).begin(size)
    }
    fn accept(&mut self, value: T) {
        (**self).accept(value)
    }
    fn end(&mut self) {
        (**self).end()
    }
    fn cancellation_requested(&self) -> bool {
        (**self).cancellation_requested()
    }
}

/// Adapts a closure into a terminal sink.
pub struct FnSink<F>(pub F);

impl<T, F: FnMut(T) + Send> Sink<T> for FnSink<F> {
    fn accept(&mut self, value: T) {
        (self.0)(value)
    }
}

impl<T: Send> Sink<T> for Vec<T> {
    fn begin(&mut self, size: Option<u64>) {
        if let Some(n) = size {
            self.reserve(n.min(crate::MAX_ARRAY_SIZE) as usize);
        }
    }
    fn accept(&mut self, value: T) {
        self.push(value)
    }
}
