//! Concatenation of two cursors.

use crate::cursor::{BoxCursor, Characteristics, Cursor, UNKNOWN_SIZE};

pub struct ConcatCursor<T> {
    first: Option<BoxCursor<T>>,
    second: BoxCursor<T>,
    unsized_sum: bool,
}

impl<T: Send + 'static> ConcatCursor<T> {
    pub fn new(first: BoxCursor<T>, second: BoxCursor<T>) -> Self {
        let unsized_sum = first
            .estimate_size()
            .checked_add(second.estimate_size())
            .is_none();
        Self {
            first: Some(first),
            second,
            unsized_sum,
        }
    }
}

impl<T: Send + 'static> Cursor<T> for ConcatCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        if let Some(first) = self.first.as_mut() {
            if first.try_advance(action) {
                return true;
            }
            self.first = None;
        }
        self.second.try_advance(action)
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        if let Some(mut first) = self.first.take() {
            first.for_each_remaining(action);
        }
        self.second.for_each_remaining(action);
    }

    /// The first split hands out the whole first cursor; afterwards splits
    /// come from the second one.
    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        match self.first.take() {
            Some(first) => Some(first),
            None => self.second.try_split(),
        }
    }

    fn estimate_size(&self) -> u64 {
        match &self.first {
            Some(first) => first
                .estimate_size()
                .checked_add(self.second.estimate_size())
                .unwrap_or(UNKNOWN_SIZE),
            None => self.second.estimate_size(),
        }
    }

    fn characteristics(&self) -> Characteristics {
        match &self.first {
            Some(first) => {
                let mut c = first.characteristics()
                    & self.second.characteristics()
                    & !(Characteristics::DISTINCT | Characteristics::SORTED);
                if self.unsized_sum {
                    c &= !(Characteristics::SIZED | Characteristics::SUBSIZED);
                }
                c
            }
            None => self.second.characteristics(),
        }
    }
}
