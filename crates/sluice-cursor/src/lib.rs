#![forbid(unsafe_code)]
//! sluice-cursor: splittable, single-pass traversal cursors.
//!
//! A cursor is the unit of parallel decomposition: `try_split` hands out a
//! prefix of the remaining elements and keeps the rest. Sequential traversal
//! uses `try_advance` / `for_each_remaining`.

pub mod array;
pub mod concat;
pub mod cursor;
pub mod distinct;
pub mod empty;
pub mod iter;

pub use array::ArrayCursor;
pub use concat::ConcatCursor;
pub use cursor::{BoxCursor, Characteristics, Cursor, UNKNOWN_SIZE};
pub use distinct::DistinctCursor;
pub use empty::EmptyCursor;
pub use iter::IterCursor;
