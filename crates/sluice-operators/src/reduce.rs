//! Reductions: reduce, fold, mutable-container collect and count.
//!
//! Every reduction runs the same leaf function over each piece of a task
//! tree and merges sibling results left to right. The combining functions
//! must be associative for parallel results to equal sequential ones.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use sluice_core::error::Result;
use sluice_core::sink::Sink;
use sluice_te::{run, SplitPolicy, TaskSpec};

use crate::segment::{copy_into, BoxSegment};
use crate::traits::TerminalOp;

/// Left fold of `acc(U, T) -> U` starting from a clone of `init`.
struct FoldSink<'f, U, A> {
    acc: Option<U>,
    f: &'f A,
}

impl<T, U, A> Sink<T> for FoldSink<'_, U, A>
where
    U: Send,
    A: Fn(U, T) -> U + Sync,
{
    fn accept(&mut self, value: T) {
        if let Some(acc) = self.acc.take() {
            self.acc = Some((self.f)(acc, value));
        }
    }
}

fn fold_segment<T, U, A>(seg: BoxSegment<T>, init: U, f: &A) -> U
where
    T: Send + 'static,
    U: Send,
    A: Fn(U, T) -> U + Sync,
{
    let mut sink = FoldSink { acc: Some(init), f };
    copy_into(seg, &mut sink);
    // `acc` is vacant only while `f` runs.
    sink.acc.unwrap_or_else(|| unreachable!("fold accumulator taken"))
}

/// `reduce(identity, op)`.
pub struct ReduceOp<T, F> {
    identity: T,
    op: F,
}

impl<T, F> ReduceOp<T, F> {
    pub fn new(identity: T, op: F) -> Self {
        Self { identity, op }
    }
}

impl<T, F> TerminalOp<T> for ReduceOp<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T, T) -> T + Send + Sync,
{
    type Output = T;

    fn name(&self) -> &'static str {
        "reduce"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<T> {
        Ok(fold_segment(seg, self.identity.clone(), &self.op))
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<T> {
        let spec = TaskSpec {
            leaf: |s: BoxSegment<T>| fold_segment(s, self.identity.clone(), &self.op),
            combine: |l: T, r: T| (self.op)(l, r),
        };
        Ok(run(seg, policy, &spec))
    }
}

/// `reduce(op)` without identity; `None` for an empty stream.
pub struct ReduceWithOp<F> {
    op: F,
}

impl<F> ReduceWithOp<F> {
    pub fn new(op: F) -> Self {
        Self { op }
    }

    fn leaf<T: Send + 'static>(&self, seg: BoxSegment<T>) -> Option<T>
    where
        F: Fn(T, T) -> T + Sync,
    {
        let step = |acc: Option<T>, v: T| {
            Some(match acc {
                Some(a) => (self.op)(a, v),
                None => v,
            })
        };
        fold_segment(seg, None, &step)
    }
}

impl<T, F> TerminalOp<T> for ReduceWithOp<F>
where
    T: Send + 'static,
    F: Fn(T, T) -> T + Send + Sync,
{
    type Output = Option<T>;

    fn name(&self) -> &'static str {
        "reduce_with"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<Option<T>> {
        Ok(self.leaf(seg))
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<Option<T>> {
        let spec = TaskSpec {
            leaf: |s: BoxSegment<T>| self.leaf(s),
            combine: |l: Option<T>, r: Option<T>| match (l, r) {
                (Some(a), Some(b)) => Some((self.op)(a, b)),
                (a, b) => a.or(b),
            },
        };
        Ok(run(seg, policy, &spec))
    }
}

/// `fold(identity, accumulate, combine)` into a different result type.
pub struct FoldOp<U, A, C> {
    identity: U,
    accumulate: A,
    combine: C,
}

impl<U, A, C> FoldOp<U, A, C> {
    pub fn new(identity: U, accumulate: A, combine: C) -> Self {
        Self {
            identity,
            accumulate,
            combine,
        }
    }
}

impl<T, U, A, C> TerminalOp<T> for FoldOp<U, A, C>
where
    T: Send + 'static,
    U: Clone + Send + Sync,
    A: Fn(U, T) -> U + Send + Sync,
    C: Fn(U, U) -> U + Send + Sync,
{
    type Output = U;

    fn name(&self) -> &'static str {
        "fold"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<U> {
        Ok(fold_segment(seg, self.identity.clone(), &self.accumulate))
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<U> {
        let spec = TaskSpec {
            leaf: |s: BoxSegment<T>| fold_segment(s, self.identity.clone(), &self.accumulate),
            combine: |l: U, r: U| (self.combine)(l, r),
        };
        Ok(run(seg, policy, &spec))
    }
}

/// Collect into a mutable container: `supplier` makes one container per
/// leaf, `accumulate` adds an element, `combine` merges the right container
/// into the left and returns the merged one.
pub struct CollectWithOp<R, S, A, C> {
    supplier: S,
    accumulate: A,
    combine: C,
    _marker: PhantomData<fn() -> R>,
}

impl<R, S, A, C> CollectWithOp<R, S, A, C> {
    pub fn new(supplier: S, accumulate: A, combine: C) -> Self {
        Self {
            supplier,
            accumulate,
            combine,
            _marker: PhantomData,
        }
    }
}

struct ContainerSink<'f, R, A> {
    container: R,
    accumulate: &'f A,
}

impl<T, R, A> Sink<T> for ContainerSink<'_, R, A>
where
    R: Send,
    A: Fn(&mut R, T) + Sync,
{
    fn accept(&mut self, value: T) {
        (self.accumulate)(&mut self.container, value)
    }
}

impl<R, S, A, C> CollectWithOp<R, S, A, C> {
    fn leaf<T>(&self, seg: BoxSegment<T>) -> R
    where
        T: Send + 'static,
        R: Send,
        S: Fn() -> R,
        A: Fn(&mut R, T) + Sync,
    {
        let mut sink = ContainerSink {
            container: (self.supplier)(),
            accumulate: &self.accumulate,
        };
        copy_into(seg, &mut sink);
        sink.container
    }
}

impl<T, R, S, A, C> TerminalOp<T> for CollectWithOp<R, S, A, C>
where
    T: Send + 'static,
    R: Send,
    S: Fn() -> R + Send + Sync,
    A: Fn(&mut R, T) + Send + Sync,
    C: Fn(R, R) -> R + Send + Sync,
{
    type Output = R;

    fn name(&self) -> &'static str {
        "collect_with"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<R> {
        Ok(self.leaf(seg))
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<R> {
        let spec = TaskSpec {
            leaf: |s: BoxSegment<T>| self.leaf(s),
            combine: |l: R, r: R| (self.combine)(l, r),
        };
        Ok(run(seg, policy, &spec))
    }
}

/// Element count. Sized chains answer without traversal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountOp;

struct CountSink<'c>(&'c AtomicU64);

impl<T> Sink<T> for CountSink<'_> {
    fn accept(&mut self, _value: T) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

impl<T: Send + 'static> TerminalOp<T> for CountOp {
    type Output = u64;

    fn name(&self) -> &'static str {
        "count"
    }

    fn evaluate_sequential(&self, seg: BoxSegment<T>) -> Result<u64> {
        if let Some(n) = seg.exact_output_size() {
            return Ok(n);
        }
        let n = AtomicU64::new(0);
        copy_into(seg, &mut CountSink(&n));
        Ok(n.into_inner())
    }

    fn evaluate_parallel(&self, seg: BoxSegment<T>, policy: &SplitPolicy) -> Result<u64> {
        if let Some(n) = seg.exact_output_size() {
            return Ok(n);
        }
        let n = AtomicU64::new(0);
        let spec = TaskSpec {
            leaf: |s: BoxSegment<T>| copy_into(s, &mut CountSink(&n)),
            combine: |(), ()| (),
        };
        run(seg, policy, &spec);
        Ok(n.into_inner())
    }
}
