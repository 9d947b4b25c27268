//! Distinct-filtering cursor over a shared concurrent "seen" set.
//!
//! Every split shares the same set, so an element is delivered by exactly one
//! piece, whichever reaches it first. Encounter order is not preserved.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashSet;

use crate::cursor::{BoxCursor, Characteristics, Cursor};

pub struct DistinctCursor<T: Hash + Eq> {
    inner: BoxCursor<T>,
    seen: Arc<DashSet<T>>,
}

impl<T> DistinctCursor<T>
where
    T: Hash + Eq + Clone + Send + Sync + 'static,
{
    pub fn new(inner: BoxCursor<T>) -> Self {
        Self {
            inner,
            seen: Arc::new(DashSet::new()),
        }
    }

    fn shared(inner: BoxCursor<T>, seen: Arc<DashSet<T>>) -> Self {
        Self { inner, seen }
    }
}

impl<T> Cursor<T> for DistinctCursor<T>
where
    T: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        loop {
            let mut next = None;
            if !self.inner.try_advance(&mut |v| next = Some(v)) {
                return false;
            }
            if let Some(v) = next {
                if self.seen.insert(v.clone()) {
                    action(v);
                    return true;
                }
            }
        }
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        let seen = &self.seen;
        self.inner.for_each_remaining(&mut |v| {
            if seen.insert(v.clone()) {
                action(v);
            }
        });
    }

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        let prefix = self.inner.try_split()?;
        Some(Box::new(DistinctCursor::shared(prefix, Arc::clone(&self.seen))))
    }

    fn estimate_size(&self) -> u64 {
        self.inner.estimate_size()
    }

    fn characteristics(&self) -> Characteristics {
        (self.inner.characteristics()
            & !(Characteristics::SIZED
                | Characteristics::SUBSIZED
                | Characteristics::SORTED
                | Characteristics::ORDERED))
            | Characteristics::DISTINCT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayCursor;
    use crate::cursor::drain;

    #[test]
    fn drops_repeated_values() {
        let mut c = DistinctCursor::new(Box::new(ArrayCursor::new(vec![1, 2, 1, 3, 2, 3])));
        assert_eq!(drain(&mut c), vec![1, 2, 3]);
        assert!(c.has_characteristics(Characteristics::DISTINCT));
        assert!(!c.has_characteristics(Characteristics::SIZED));
    }

    #[test]
    fn splits_share_the_seen_set() {
        let mut c = DistinctCursor::new(Box::new(ArrayCursor::new(vec![7, 8, 7, 8])));
        let mut prefix = c.try_split().unwrap();
        let mut all = drain(prefix.as_mut());
        all.extend(drain(&mut c));
        assert_eq!(all, vec![7, 8]);
    }

    #[test]
    fn optional_values_key_the_set() {
        let mut c = DistinctCursor::new(Box::new(ArrayCursor::new(vec![None, Some(1), None])));
        assert_eq!(drain(&mut c), vec![None, Some(1)]);
    }
}
