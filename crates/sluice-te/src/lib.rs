#![forbid(unsafe_code)]
//! sluice-te: divide-and-conquer task engine.
//!
//! A piece of work (a cursor or a segment) is split recursively until its
//! estimate falls below a threshold derived from the root estimate and the
//! pool size. Leaves run on the rayon pool through `rayon::join`; sibling
//! results are merged with an associative combiner.
//!
//! Variants:
//! - [`run`]: plain split / fork / merge.
//! - [`run_short_circuit`]: shared write-once result slot plus cancellation
//!   of later tasks (find-first, find-any, matching).
//! - [`run_ordered`]: leaves emit in encounter order, buffering until their
//!   left predecessor completes.

pub mod ordered;
pub mod schedule;
pub mod short_circuit;
pub mod task;
pub mod tree;

pub use ordered::{run_ordered, OrderedSpec};
pub use schedule::{SplitPolicy, Splittable};
pub use short_circuit::{run_short_circuit, ShortCircuitSpec};
pub use task::{run, TaskSpec};
pub use tree::TaskNode;
