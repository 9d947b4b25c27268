//! Array-backed cursor with exact halving splits.
//!
//! Every split of one array shares the same slot storage and owns a disjoint
//! index range of it, so a split is constant time whatever the array length.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cursor::{BoxCursor, Characteristics, Cursor};

pub struct ArrayCursor<T> {
    slots: Arc<[Mutex<Option<T>>]>,
    /// Next index to hand out.
    lo: usize,
    /// One past the last index owned by this cursor.
    hi: usize,
    characteristics: Characteristics,
}

impl<T: Send> ArrayCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_characteristics(items, Characteristics::empty())
    }

    /// `extra` is added to the SIZED | SUBSIZED | ORDERED | IMMUTABLE base,
    /// e.g. SORTED when the caller knows the array is sorted.
    pub fn with_characteristics(items: Vec<T>, extra: Characteristics) -> Self {
        let slots: Arc<[Mutex<Option<T>>]> = items.into_iter().map(|v| Mutex::new(Some(v))).collect();
        Self {
            lo: 0,
            hi: slots.len(),
            slots,
            characteristics: Characteristics::SIZED
                | Characteristics::SUBSIZED
                | Characteristics::ORDERED
                | Characteristics::IMMUTABLE
                | extra,
        }
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    /// Takes the element at `lo`. Ranges are disjoint, so a slot is only
    /// ever taken once.
    fn take_next(&mut self) -> Option<T> {
        if self.lo == self.hi {
            return None;
        }
        let v = self.slots[self.lo].lock().take();
        self.lo += 1;
        v
    }
}

impl<T: Send + 'static> Cursor<T> for ArrayCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        match self.take_next() {
            Some(v) => {
                action(v);
                true
            }
            None => false,
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        while let Some(v) = self.take_next() {
            action(v);
        }
    }

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        let half = self.len() / 2;
        if half == 0 {
            return None;
        }
        let mid = self.lo + half;
        let prefix = ArrayCursor {
            slots: Arc::clone(&self.slots),
            lo: self.lo,
            hi: mid,
            characteristics: self.characteristics,
        };
        self.lo = mid;
        Some(Box::new(prefix))
    }

    fn estimate_size(&self) -> u64 {
        self.len() as u64
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }
}
