//! Task trees that may finish before visiting every element.
//!
//! Each tree owns one write-once result slot. Tasks check the slot and their
//! cancellation state before doing any work, and a leaf passes the same
//! check to its traversal so it can stop between elements.
//!
//! With `find_first` set, a found result is only published directly by a
//! leftmost task. Any other task that finds something cancels every task
//! after it and hands its result up; at each merge the left child's result
//! wins over the right child's, and the merged result goes through the same
//! publication step. Without `find_first` the first result found anywhere
//! wins.

use std::sync::{Arc, OnceLock};

use crate::schedule::{SplitPolicy, Splittable};
use crate::tree::TaskNode;

pub struct ShortCircuitSpec<L> {
    /// Runs a leaf. The second argument reports whether the leaf should stop.
    /// `Some` is a short-circuiting result.
    pub leaf: L,
    pub find_first: bool,
}

struct Shared<R> {
    slot: OnceLock<R>,
    find_first: bool,
}

impl<R> Shared<R> {
    fn should_stop(&self, node: &TaskNode) -> bool {
        self.slot.get().is_some() || node.is_cancelled()
    }

    fn publish(&self, value: R) {
        // Losing the race is fine: the slot keeps the first writer.
        let _ = self.slot.set(value);
    }

    /// Handle a result found by `node`. Returns what the node reports to
    /// its parent.
    fn found(&self, node: &TaskNode, value: R) -> Option<R> {
        if !self.find_first {
            self.publish(value);
            return None;
        }
        if node.is_leftmost() {
            self.publish(value);
            None
        } else {
            tracing::trace!(task = ?node.id(), depth = node.depth(), "cancelling later tasks");
            node.cancel_later_nodes();
            Some(value)
        }
    }
}

/// Evaluate a short-circuiting task tree; `None` when nothing was found.
pub fn run_short_circuit<P, R, L>(
    piece: P,
    policy: &SplitPolicy,
    spec: &ShortCircuitSpec<L>,
) -> Option<R>
where
    P: Splittable,
    R: Send + Sync,
    L: Fn(P, &dyn Fn() -> bool) -> Option<R> + Sync,
{
    let shared = Shared {
        slot: OnceLock::new(),
        find_first: spec.find_first,
    };
    let threshold = policy.target_size(piece.estimate_size());
    let root = TaskNode::root();
    let local = compute(piece, root, threshold, &spec.leaf, &shared);
    // A result still travelling up stops at the root, which is leftmost.
    if let Some(v) = local {
        shared.publish(v);
    }
    shared.slot.into_inner()
}

fn compute<P, R, L>(
    mut piece: P,
    node: Arc<TaskNode>,
    threshold: u64,
    leaf: &L,
    shared: &Shared<R>,
) -> Option<R>
where
    P: Splittable,
    R: Send + Sync,
    L: Fn(P, &dyn Fn() -> bool) -> Option<R> + Sync,
{
    if shared.should_stop(&node) {
        return None;
    }
    if piece.estimate_size() > threshold {
        if let Some(prefix) = piece.try_split() {
            let (ln, rn) = node.fork();
            let (left, right) = if node.depth() % 2 == 0 {
                rayon::join(
                    || compute(prefix, ln, threshold, leaf, shared),
                    || compute(piece, rn, threshold, leaf, shared),
                )
            } else {
                let (right, left) = rayon::join(
                    || compute(piece, rn, threshold, leaf, shared),
                    || compute(prefix, ln, threshold, leaf, shared),
                );
                (left, right)
            };
            return match left.or(right) {
                Some(v) if shared.find_first => shared.found(&node, v),
                _ => None,
            };
        }
    }
    let stop = || shared.should_stop(&node);
    let result = leaf(piece, &stop);
    if stop() {
        return None;
    }
    result.and_then(|v| shared.found(&node, v))
}
