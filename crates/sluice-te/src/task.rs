//! Plain split / fork / merge.

use crate::schedule::{SplitPolicy, Splittable};

/// Leaf and merge functions of a task tree.
///
/// `combine` must be associative; it receives the left result first.
pub struct TaskSpec<L, C> {
    pub leaf: L,
    pub combine: C,
}

/// Evaluate `piece` as a task tree on the current rayon pool.
///
/// A piece is split while its estimate exceeds the threshold computed from
/// the root estimate and the piece still splits. Panics raised by the leaf or
/// combine functions propagate to the caller.
pub fn run<P, R, L, C>(piece: P, policy: &SplitPolicy, spec: &TaskSpec<L, C>) -> R
where
    P: Splittable,
    R: Send,
    L: Fn(P) -> R + Sync,
    C: Fn(R, R) -> R + Sync,
{
    let estimate = piece.estimate_size();
    let threshold = policy.target_size(estimate);
    tracing::trace!(estimate, threshold, "task tree start");
    compute(piece, threshold, 0, spec)
}

fn compute<P, R, L, C>(mut piece: P, threshold: u64, depth: u32, spec: &TaskSpec<L, C>) -> R
where
    P: Splittable,
    R: Send,
    L: Fn(P) -> R + Sync,
    C: Fn(R, R) -> R + Sync,
{
    if piece.estimate_size() > threshold {
        if let Some(prefix) = piece.try_split() {
            // The inline half alternates with depth.
            let (left, right) = if depth % 2 == 0 {
                rayon::join(
                    || compute(prefix, threshold, depth + 1, spec),
                    || compute(piece, threshold, depth + 1, spec),
                )
            } else {
                let (right, left) = rayon::join(
                    || compute(piece, threshold, depth + 1, spec),
                    || compute(prefix, threshold, depth + 1, spec),
                );
                (left, right)
            };
            return (spec.combine)(left, right);
        }
    }
    (spec.leaf)(piece)
}
