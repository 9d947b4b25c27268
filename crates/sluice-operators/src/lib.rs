#![forbid(unsafe_code)]
//! sluice-operators: stage and terminal operators.
//!
//! - Stateless stages (`map`, `filter`, `flat_map`, `peek`, `unordered`) only
//!   contribute a sink to the chain.
//! - Stateful stages (`sort`, `distinct`, `slice`) buffer or count and know
//!   how to evaluate themselves over a parallel upstream.
//! - Terminals (`for_each`, `reduce`, `find`, `matching`, `collect`) consume a
//!   segment sequentially or as a task tree.
//!
//! Operators are immutable after construction and shared by every task of
//! an evaluation.

pub mod collect;
pub mod distinct;
pub mod filter;
pub mod find;
pub mod flat_map;
pub mod for_each;
pub mod map;
pub mod matching;
pub mod peek;
pub mod reduce;
pub mod segment;
pub mod slice;
pub mod sort;
pub mod traits;
pub mod unordered;
pub mod wrapping;

pub use collect::{collect_node, ToNodeOp};
pub use segment::{
    copy_into, copy_into_with_cancel, BoxSegment, CursorSegment, FlaggedSegment, PipedSegment,
    Segment, Stepper,
};
pub use traits::{node_segment, StageOp, StatefulOp, TerminalOp};
pub use wrapping::WrappingCursor;
