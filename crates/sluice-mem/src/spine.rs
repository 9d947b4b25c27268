//! Chunked growable buffer ("spine").
//!
//! Elements are appended into fixed-capacity chunks. The first chunk holds
//! `1 << initial_power` elements and every later chunk doubles the previous
//! capacity. Chunks are never reallocated, so an appended element keeps its
//! address for the life of the buffer. Until a second chunk is needed the
//! buffer is a single flat vector and no spine is allocated.

use std::collections::VecDeque;

use sluice_core::error::{Error, Result};

use sluice_cursor::{ArrayCursor, BoxCursor, Characteristics, Cursor};

pub const MIN_CHUNK_POWER: u32 = 4;
pub const MAX_CHUNK_POWER: u32 = 30;

pub struct SpineBuffer<T> {
    initial_power: u32,
    /// Chunk being written.
    cur: Vec<T>,
    /// Completed (full) chunks, allocated lazily on the first overflow.
    spine: Vec<Vec<T>>,
    /// `prior[i]` is the number of elements stored before `spine[i]`.
    prior: Vec<u64>,
    /// Elements in `spine`.
    spine_len: u64,
}

impl<T> SpineBuffer<T> {
    pub fn new() -> Self {
        Self::with_initial_power(MIN_CHUNK_POWER)
    }

    /// Size the first chunk to hold at least `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        let power = usize::BITS - capacity.saturating_sub(1).leading_zeros();
        Self::with_initial_power(power.clamp(MIN_CHUNK_POWER, MAX_CHUNK_POWER))
    }

    fn with_initial_power(initial_power: u32) -> Self {
        Self {
            initial_power,
            cur: Vec::new(),
            spine: Vec::new(),
            prior: Vec::new(),
            spine_len: 0,
        }
    }

    /// Capacity of chunk `index`.
    pub fn chunk_size(&self, index: usize) -> usize {
        let power = (self.initial_power as usize + index).min(MAX_CHUNK_POWER as usize);
        1usize << power
    }

    /// Number of chunks holding or ready to hold elements.
    pub fn chunk_count(&self) -> usize {
        self.spine.len() + 1
    }

    pub fn len(&self) -> u64 {
        self.spine_len + self.cur.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total capacity of the allocated chunks.
    pub fn capacity(&self) -> u64 {
        self.spine.iter().map(|c| c.capacity() as u64).sum::<u64>() + self.cur.capacity() as u64
    }

    pub fn push(&mut self, value: T) {
        let index = self.spine.len();
        let size = self.chunk_size(index);
        if self.cur.capacity() == 0 {
            self.cur = Vec::with_capacity(size);
        } else if self.cur.len() == size {
            let next = Vec::with_capacity(self.chunk_size(index + 1));
            let full = std::mem::replace(&mut self.cur, next);
            self.prior.push(self.spine_len);
            self.spine_len += full.len() as u64;
            self.spine.push(full);
        }
        self.cur.push(value);
    }

    pub fn get(&self, index: u64) -> Result<&T> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        if index >= self.spine_len {
            return Ok(&self.cur[(index - self.spine_len) as usize]);
        }
        // Last chunk whose prefix count is <= index.
        let chunk = self.prior.partition_point(|&p| p <= index) - 1;
        Ok(&self.spine[chunk][(index - self.prior[chunk]) as usize])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.spine.iter().flatten().chain(self.cur.iter())
    }

    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        for v in self.iter() {
            f(v);
        }
    }

    pub fn clear(&mut self) {
        self.spine.clear();
        self.prior.clear();
        self.spine_len = 0;
        self.cur.clear();
    }

    /// Move all elements into one vector. Fails before allocating when the
    /// length exceeds the maximum array size.
    pub fn into_vec(self) -> Result<Vec<T>> {
        let len = Error::check_array_size(self.len())?;
        if self.spine.is_empty() {
            return Ok(self.cur);
        }
        let mut out = Vec::with_capacity(len);
        for chunk in self.spine {
            out.extend(chunk);
        }
        out.extend(self.cur);
        Ok(out)
    }

    /// Traverse the chunks as a splittable cursor.
    pub fn into_cursor(self) -> SpineCursor<T>
    where
        T: Send + 'static,
    {
        let mut chunks: VecDeque<ArrayCursor<T>> =
            self.spine.into_iter().map(ArrayCursor::new).collect();
        if !self.cur.is_empty() {
            chunks.push_back(ArrayCursor::new(self.cur));
        }
        SpineCursor { chunks }
    }
}

impl<T: Clone> SpineBuffer<T> {
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let len = Error::check_array_size(self.len())?;
        let mut out = Vec::with_capacity(len);
        out.extend(self.iter().cloned());
        Ok(out)
    }

    /// Copy every element into `dest[offset..offset + len]`.
    pub fn copy_into(&self, dest: &mut [T], offset: usize) -> Result<()> {
        let len = self.len();
        let end = (offset as u64).saturating_add(len);
        if end > dest.len() as u64 {
            return Err(Error::IndexOutOfBounds {
                index: end.saturating_sub(1),
                len: dest.len() as u64,
            });
        }
        let mut at = offset;
        for chunk in self.spine.iter().chain(std::iter::once(&self.cur)) {
            dest[at..at + chunk.len()].clone_from_slice(chunk);
            at += chunk.len();
        }
        Ok(())
    }
}

impl<T> Default for SpineBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for SpineBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}

impl<T> IntoIterator for SpineBuffer<T> {
    type Item = T;
    type IntoIter = std::iter::Chain<
        std::iter::Flatten<std::vec::IntoIter<Vec<T>>>,
        std::vec::IntoIter<T>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.spine.into_iter().flatten().chain(self.cur)
    }
}

impl<T> FromIterator<T> for SpineBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = SpineBuffer::new();
        buf.extend(iter);
        buf
    }
}

/// Cursor over the chunks of a spine buffer. Splits hand out whole chunks
/// until one remains, then halve that chunk.
pub struct SpineCursor<T> {
    chunks: VecDeque<ArrayCursor<T>>,
}

impl<T: Send + 'static> Cursor<T> for SpineCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        while let Some(front) = self.chunks.front_mut() {
            if front.try_advance(action) {
                return true;
            }
            self.chunks.pop_front();
        }
        false
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        for mut chunk in self.chunks.drain(..) {
            chunk.for_each_remaining(action);
        }
    }

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        match self.chunks.len() {
            0 => None,
            1 => self.chunks.front_mut().and_then(|c| c.try_split()),
            n => {
                let suffix = self.chunks.split_off(n / 2);
                let prefix = std::mem::replace(&mut self.chunks, suffix);
                Some(Box::new(SpineCursor { chunks: prefix }))
            }
        }
    }

    fn estimate_size(&self) -> u64 {
        self.chunks.iter().map(|c| c.estimate_size()).sum()
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::SIZED | Characteristics::SUBSIZED | Characteristics::ORDERED
    }
}
