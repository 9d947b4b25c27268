#![forbid(unsafe_code)]
//! sluice-mem: materialization of intermediate results.
//!
//! - `SpineBuffer`: append-only buffer of geometrically growing chunks, used
//!   when the final size is not known up front.
//! - `Node`: immutable, possibly tree-shaped view over materialized elements.
//! - `NodeBuilder`: a `Sink` that builds a `Node` from one traversal pass.
//!
//! Buffers and nodes are owned by the task or stage that created them and are
//! never mutated concurrently.

pub mod builder;
pub mod node;
pub mod spine;

pub use builder::NodeBuilder;
pub use node::{Node, NodeCursor};
pub use spine::{SpineBuffer, SpineCursor};
