//! The traversal cursor contract.

pub use sluice_core::flags::Characteristics;

/// Estimate reported when the remaining size cannot be computed.
pub const UNKNOWN_SIZE: u64 = u64::MAX;

/// Owned, type-erased cursor.
pub type BoxCursor<T> = Box<dyn Cursor<T>>;

/// A splittable, possibly infinite, single-pass sequence.
///
/// Invariants:
/// - `try_split` returns a cursor over a prefix of the remaining elements and
///   leaves `self` holding exactly the rest (no overlap).
/// - For SIZED cursors, the sizes of the two halves add up to the size before
///   the split.
pub trait Cursor<T>: Send {
    /// Deliver at most one element. Returns false once exhausted.
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool;

    /// Deliver every remaining element.
    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        while self.try_advance(action) {}
    }

    /// Split off a prefix, or `None` when no further split is possible.
    fn try_split(&mut self) -> Option<BoxCursor<T>>;

    /// Remaining element count; exact for SIZED cursors, otherwise an upper
    /// bound or [`UNKNOWN_SIZE`].
    fn estimate_size(&self) -> u64;

    fn characteristics(&self) -> Characteristics;

    fn exact_size_if_known(&self) -> Option<u64> {
        if self.characteristics().contains(Characteristics::SIZED) {
            Some(self.estimate_size())
        } else {
            None
        }
    }

    fn has_characteristics(&self, c: Characteristics) -> bool {
        self.characteristics().contains(c)
    }
}

impl<T, C: Cursor<T> + ?Sized> Cursor<T> for Box<C> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        (**self).try_advance(action)
    }
    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        (**self).for_each_remaining(action)
    }
    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        (**self).try_split()
    }
    fn estimate_size(&self) -> u64 {
        (**self).estimate_size()
    }
    fn characteristics(&self) -> Characteristics {
        (**self).characteristics()
    }
}

/// Drain a cursor into a vector. Test and diagnostics helper.
pub fn drain<T>(cursor: &mut dyn Cursor<T>) -> Vec<T> {
    let mut out = Vec::new();
    cursor.for_each_remaining(&mut |v| out.push(v));
    out
}

/// Split recursively until no piece splits further, returning the pieces in
/// encounter order.
pub fn split_fully<T>(cursor: BoxCursor<T>, max_depth: usize) -> Vec<BoxCursor<T>> {
    fn go<T>(mut c: BoxCursor<T>, depth: usize, out: &mut Vec<BoxCursor<T>>) {
        if depth > 0 {
            if let Some(prefix) = c.try_split() {
                go(prefix, depth - 1, out);
                go(c, depth - 1, out);
                return;
            }
        }
        out.push(c);
    }
    let mut out = Vec::new();
    go(cursor, max_depth, &mut out);
    out
}
