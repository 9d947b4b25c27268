//! Collect a segment into a node.

use sluice_core::error::{Error, Result};
use sluice_mem::{Node, NodeBuilder};
use sluice_te::{run, SplitPolicy, TaskSpec};

use crate::segment::{copy_into, BoxSegment};
use crate::traits::TerminalOp;

/// Build one leaf node from a segment.
pub fn build_leaf<T: Send + 'static>(seg: BoxSegment<T>) -> Result<Node<T>> {
    let mut builder = NodeBuilder::new();
    copy_into(seg, &mut builder);
    builder.build()
}

/// Collect a segment in parallel: one node per leaf task, joined in encounter
/// order. Sized inputs beyond the maximum array size fail before any work.
pub fn collect_node<T: Send + 'static>(seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<Node<T>> {
    if let Some(n) = seg.exact_output_size() {
        Error::check_array_size(n)?;
    }
    let spec = TaskSpec {
        leaf: build_leaf::<T>,
        combine: |l: Result<Node<T>>, r: Result<Node<T>>| Ok(Node::concat(l?, r?)),
    };
    let node = run(seg, policy, &spec)?;
    tracing::trace!(count = node.count(), children = node.child_count(), "collected node");
    Ok(node)
}

/// Terminal collecting into a flat node.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToNodeOp;

impl<T: Send + 'static> TerminalOp<T> for ToNodeOp {
    type Output = Node<T>;

    fn name(&self) -> &'static str {
        "to_node"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<Node<T>> {
        if let Some(n) = seg.exact_output_size() {
            Error::check_array_size(n)?;
        }
        build_leaf(seg)?.flatten()
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<Node<T>> {
        collect_node(seg, policy)?.flatten()
    }
}
