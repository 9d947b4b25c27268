use std::marker::PhantomData;

use crate::cursor::{BoxCursor, Characteristics, Cursor};

/// A cursor with no elements.
pub struct EmptyCursor<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EmptyCursor<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for EmptyCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cursor<T> for EmptyCursor<T> {
    fn try_advance(&mut self, _action: &mut dyn FnMut(T)) -> bool {
        false
    }

    fn for_each_remaining(&mut self, _action: &mut dyn FnMut(T)) {}

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        None
    }

    fn estimate_size(&self) -> u64 {
        0
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::SIZED | Characteristics::SUBSIZED
    }
}
