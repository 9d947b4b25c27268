//! Iterator-backed cursor.
//!
//! An arbitrary iterator cannot split, so `try_split` pulls a batch into an
//! array cursor and hands that out. The first batch holds `batch_unit`
//! elements and each later one doubles the previous, up to `max_batch`.

use crate::array::ArrayCursor;
use crate::cursor::{BoxCursor, Characteristics, Cursor, UNKNOWN_SIZE};

pub const DEFAULT_BATCH_UNIT: usize = 1 << 10;
pub const DEFAULT_MAX_BATCH: usize = 1 << 25;

pub struct IterCursor<I: Iterator> {
    iter: I,
    /// Remaining size when the iterator reports an exact size hint.
    est: u64,
    batch: usize,
    batch_unit: usize,
    max_batch: usize,
    characteristics: Characteristics,
}

impl<I> IterCursor<I>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
{
    pub fn new(iter: I) -> Self {
        Self::with_batching(iter, DEFAULT_BATCH_UNIT, DEFAULT_MAX_BATCH)
    }

    pub fn with_batching(iter: I, batch_unit: usize, max_batch: usize) -> Self {
        let (lo, hi) = iter.size_hint();
        let (est, sized) = match hi {
            Some(hi) if hi == lo => (lo as u64, true),
            _ => (UNKNOWN_SIZE, false),
        };
        let mut characteristics = Characteristics::ORDERED;
        if sized {
            characteristics |= Characteristics::SIZED;
        }
        let batch_unit = batch_unit.max(1);
        Self {
            iter,
            est,
            batch: 0,
            batch_unit,
            max_batch: max_batch.max(batch_unit),
            characteristics,
        }
    }

    fn sized(&self) -> bool {
        self.characteristics.contains(Characteristics::SIZED)
    }

    fn consumed(&mut self, n: u64) {
        if self.est != UNKNOWN_SIZE {
            self.est = self.est.saturating_sub(n);
        }
    }
}

impl<I> Cursor<I::Item> for IterCursor<I>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
{
    fn try_advance(&mut self, action: &mut dyn FnMut(I::Item)) -> bool {
        match self.iter.next() {
            Some(v) => {
                self.consumed(1);
                action(v);
                true
            }
            None => {
                self.est = 0;
                false
            }
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(I::Item)) {
        for v in self.iter.by_ref() {
            action(v);
        }
        self.est = 0;
    }

    fn try_split(&mut self) -> Option<BoxCursor<I::Item>> {
        if self.est <= 1 {
            return None;
        }
        let mut n = self.batch.saturating_mul(2).max(self.batch_unit).min(self.max_batch);
        if self.est != UNKNOWN_SIZE {
            n = n.min(self.est as usize);
        }
        let batch: Vec<I::Item> = self.iter.by_ref().take(n).collect();
        if batch.is_empty() {
            self.est = 0;
            return None;
        }
        self.batch = batch.len();
        self.consumed(batch.len() as u64);
        // An exhausted unsized iterator becomes known-empty.
        if batch.len() < n && !self.sized() {
            self.est = 0;
        }
        let extra = self.characteristics & !(Characteristics::SIZED | Characteristics::ORDERED);
        Some(Box::new(ArrayCursor::with_characteristics(batch, extra)))
    }

    fn estimate_size(&self) -> u64 {
        self.est
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::drain;

    #[test]
    fn batches_double_from_unit() {
        let mut c = IterCursor::with_batching(std::iter::successors(Some(0u64), |v| Some(v + 1)), 4, 1 << 20);
        assert_eq!(c.estimate_size(), UNKNOWN_SIZE);
        let sizes: Vec<u64> = (0..5).map(|_| c.try_split().unwrap().estimate_size()).collect();
        assert_eq!(sizes, vec![4, 8, 16, 32, 64]);
    }

    #[test]
    fn batches_are_consecutive_prefixes() {
        let mut c = IterCursor::with_batching(0..1_000u32, 2, 1 << 10);
        let mut first = c.try_split().unwrap();
        let mut second = c.try_split().unwrap();
        assert_eq!(drain(first.as_mut()), vec![0, 1]);
        assert_eq!(drain(second.as_mut()), vec![2, 3, 4, 5]);
        assert_eq!(c.estimate_size(), 994);
    }

    #[test]
    fn batch_is_capped() {
        let mut c = IterCursor::with_batching(0..10_000u32, 4, 6);
        let sizes: Vec<u64> = (0..4).map(|_| c.try_split().unwrap().estimate_size()).collect();
        assert_eq!(sizes, vec![4, 6, 6, 6]);
    }

    #[test]
    fn sized_iterator_conserves_size() {
        let mut c = IterCursor::with_batching(0..100u32, 8, 1024);
        assert_eq!(c.exact_size_if_known(), Some(100));
        let mut prefix = c.try_split().unwrap();
        assert_eq!(prefix.estimate_size() + c.estimate_size(), 100);
        let mut all = drain(prefix.as_mut());
        all.extend(drain(&mut c));
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn exhausted_unsized_iterator_stops_splitting() {
        let mut c = IterCursor::with_batching((0..5u32).filter(|v| v % 2 == 0), 16, 64);
        let mut prefix = c.try_split().unwrap();
        assert_eq!(drain(prefix.as_mut()), vec![0, 2, 4]);
        assert!(c.try_split().is_none());
        assert_eq!(c.estimate_size(), 0);
    }
}
