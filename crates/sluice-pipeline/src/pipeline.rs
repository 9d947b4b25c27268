//! The `Pipeline` facade.
//!
//! A pipeline is a recipe: sources and intermediate stages only record
//! themselves. Evaluation starts at a terminal, which consumes the pipeline.

use std::cmp::Ordering;
use std::hash::Hash;
use std::sync::Arc;

use rayon::ThreadPool;

use sluice_core::config::EngineConfig;
use sluice_core::error::{Error, Result};
use sluice_core::flags::{Characteristics, Property, StreamFlags};
use sluice_core::id::StageId;
use sluice_core::kind::Numeric;
use sluice_cursor::{ArrayCursor, BoxCursor, Cursor, EmptyCursor, IterCursor};
use sluice_mem::Node;
use sluice_operators::distinct::DistinctOp;
use sluice_operators::filter::FilterOp;
use sluice_operators::find::FindOp;
use sluice_operators::flat_map::FlatMapOp;
use sluice_operators::for_each::{ForEachOp, ForEachOrderedOp};
use sluice_operators::map::MapOp;
use sluice_operators::matching::{MatchKind, MatchOp};
use sluice_operators::peek::PeekOp;
use sluice_operators::reduce::{CollectWithOp, CountOp, FoldOp, ReduceOp, ReduceWithOp};
use sluice_operators::slice::SliceOp;
use sluice_operators::sort::SortOp;
use sluice_operators::unordered::UnorderedOp;
use sluice_operators::{FlaggedSegment, StageOp, TerminalOp, ToNodeOp, WrappingCursor};

use crate::context::ExecContext;
use crate::source::{BoxSource, ConcatSource, CursorSource, StageSource};
use crate::stage::{StageGraph, StageKind, StageRecord};

type CloseAction = Box<dyn FnOnce() + Send>;

/// Close actions, run once in registration order when dropped.
#[derive(Default)]
struct CloseGuard {
    actions: Vec<CloseAction>,
}

impl CloseGuard {
    fn absorb(&mut self, mut other: CloseGuard) {
        self.actions.append(&mut other.actions);
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        for action in self.actions.drain(..) {
            action();
        }
    }
}

/// A lazily evaluated pipeline of `T` elements.
pub struct Pipeline<T: Send + 'static> {
    graph: StageGraph,
    stage: StageId,
    head: BoxSource<T>,
    ctx: ExecContext,
    deferred: Option<Error>,
    close: CloseGuard,
}

impl<T: Send + 'static> Pipeline<T> {
    fn source<F>(name: &'static str, flags: StreamFlags, supplier: F) -> Self
    where
        F: FnOnce(&EngineConfig) -> Result<BoxCursor<T>> + Send + 'static,
    {
        let mut graph = StageGraph::new();
        let stage = graph.add_source(name, flags);
        Self {
            graph,
            stage,
            head: Box::new(CursorSource::new(supplier, flags)),
            ctx: ExecContext::default(),
            deferred: None,
            close: CloseGuard::default(),
        }
    }

    /// Source over an owned vector: ordered and sized.
    pub fn from_vec(items: Vec<T>) -> Self {
        let flags = StreamFlags::from_characteristics(
            Characteristics::ORDERED | Characteristics::SIZED | Characteristics::SUBSIZED,
        );
        Self::source("vec", flags, move |_| {
            Ok(Box::new(ArrayCursor::new(items)) as BoxCursor<T>)
        })
    }

    /// Source over an iterator of unknown size. Parallel splits hand out
    /// growing batches sized by the pipeline's config.
    pub fn from_iterator<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let iter = iter.into_iter();
        let flags = StreamFlags::from_characteristics(Characteristics::ORDERED);
        Self::source("iterator", flags, move |cfg: &EngineConfig| {
            Ok(Box::new(IterCursor::with_batching(
                iter,
                cfg.iter_batch_unit,
                cfg.iter_max_batch,
            )) as BoxCursor<T>)
        })
    }

    pub fn from_cursor(cursor: BoxCursor<T>) -> Self {
        let flags = StreamFlags::from_characteristics(cursor.characteristics());
        Self::source("cursor", flags, move |_| Ok(cursor))
    }

    /// Source whose cursor is created only when a terminal runs.
    /// `characteristics` must describe the cursor `supplier` returns.
    pub fn from_supplier<F>(characteristics: Characteristics, supplier: F) -> Self
    where
        F: FnOnce() -> BoxCursor<T> + Send + 'static,
    {
        let flags = StreamFlags::from_characteristics(characteristics);
        Self::source("supplier", flags, move |_| Ok(supplier()))
    }

    pub fn empty() -> Self {
        let flags = StreamFlags::from_characteristics(Characteristics::SIZED);
        Self::source("empty", flags, |_| {
            Ok(Box::new(EmptyCursor::new()) as BoxCursor<T>)
        })
    }

    /// Every element of `first`, then every element of `second`.
    ///
    /// The result is ordered or sized only when both inputs are, and runs in
    /// `first`'s mode. Close actions of both inputs are kept.
    pub fn concat(first: Pipeline<T>, second: Pipeline<T>) -> Self {
        let Pipeline {
            mut graph,
            stage,
            head,
            ctx,
            mut deferred,
            mut close,
        } = first;
        let second_flags = second.graph.combined_flags(second.stage);
        let first_flags = graph.combined_flags(stage);

        let mut chars = Characteristics::empty();
        for (p, c) in [
            (Property::Ordered, Characteristics::ORDERED),
            (Property::Sized, Characteristics::SIZED),
        ] {
            if first_flags.is_known(p) && second_flags.is_known(p) {
                chars |= c;
            }
        }
        let flags = StreamFlags::from_characteristics(chars);

        if let Err(e) = graph.consume(stage) {
            deferred.get_or_insert(e);
        }
        let Pipeline {
            graph: mut other,
            stage: other_stage,
            head: other_head,
            deferred: other_deferred,
            close: other_close,
            ..
        } = second;
        if let Err(e) = other.consume(other_stage) {
            deferred.get_or_insert(e);
        }
        if let Some(e) = other_deferred {
            deferred.get_or_insert(e);
        }
        graph.absorb(other, other_stage);
        close.absorb(other_close);

        let stage = graph.add_source("concat", flags);
        Self {
            graph,
            stage,
            head: Box::new(ConcatSource::new(head, other_head, flags)),
            ctx,
            deferred,
            close,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        match config.validate() {
            Ok(()) => self.ctx.set_config(Arc::new(config)),
            Err(e) => {
                self.deferred.get_or_insert(e);
            }
        }
        self
    }

    /// Evaluate in parallel on the global rayon pool.
    pub fn parallel(mut self) -> Self {
        self.ctx.set_parallel(true);
        self
    }

    /// Evaluate in parallel on `pool`.
    pub fn on_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        let config = Arc::new(self.ctx.config().clone());
        self.ctx = ExecContext::with_pool(pool, config);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.ctx.set_parallel(false);
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.ctx.is_parallel()
    }

    /// Combined flags of the last stage.
    pub fn flags(&self) -> StreamFlags {
        self.graph.combined_flags(self.stage)
    }

    /// The stage chain, source first.
    pub fn stages(&self) -> Vec<&StageRecord> {
        self.graph.chain(self.stage)
    }

    /// Register an action to run once after the terminal (or cursor) is done,
    /// or on [`Pipeline::close`].
    pub fn on_close(mut self, action: impl FnOnce() + Send + 'static) -> Self {
        self.close.actions.push(Box::new(action));
        self
    }

    /// Discard the pipeline without evaluating it, running close actions.
    pub fn close(self) {
        tracing::debug!(stage = %self.stage, "closing pipeline");
    }

    fn chain<U, O>(self, op: O) -> Pipeline<U>
    where
        U: Send + 'static,
        O: StageOp<T, U>,
    {
        let Pipeline {
            mut graph,
            stage,
            head,
            ctx,
            mut deferred,
            close,
        } = self;
        let next = match graph.link(
            stage,
            op.name(),
            StageKind::Intermediate,
            op.flags(),
            op.is_stateful(),
        ) {
            Ok(id) => id,
            Err(e) => {
                deferred.get_or_insert(e);
                stage
            }
        };
        Pipeline {
            graph,
            stage: next,
            head: Box::new(StageSource::new(head, Arc::new(op))),
            ctx,
            deferred,
            close,
        }
    }

    pub fn map<U, F>(self, f: F) -> Pipeline<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.chain(MapOp::<T, U, F>::new(f))
    }

    pub fn filter<P>(self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.chain(FilterOp::new(pred))
    }

    pub fn flat_map<I, F>(self, f: F) -> Pipeline<I::Item>
    where
        I: IntoIterator + 'static,
        I::Item: Send + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        self.chain(FlatMapOp::<T, I, F>::new(f))
    }

    pub fn peek<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.chain(PeekOp::new(f))
    }

    /// Drop the encounter-order constraint. No stage is added when the
    /// pipeline is already known unordered.
    pub fn unordered(self) -> Self {
        if self.flags().is_known_false(Property::Ordered) {
            return self;
        }
        self.chain(UnorderedOp)
    }

    /// Stable sort by `cmp`.
    pub fn sorted_by<C>(self, cmp: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.chain(SortOp::by(cmp))
    }

    pub fn distinct(self) -> Self
    where
        T: Hash + Eq + Clone + Sync,
    {
        self.chain(DistinctOp)
    }

    pub fn skip(self, n: u64) -> Self {
        self.chain(SliceOp::new(n, None))
    }

    pub fn limit(self, n: u64) -> Self {
        self.chain(SliceOp::new(0, Some(n)))
    }

    /// Skip `skip` elements, then keep at most `limit`.
    pub fn slice(self, skip: u64, limit: u64) -> Self {
        self.chain(SliceOp::new(skip, Some(limit)))
    }

    fn evaluate<O>(self, op: O) -> Result<O::Output>
    where
        O: TerminalOp<T>,
        O::Output: Send,
    {
        let Pipeline {
            mut graph,
            stage,
            head,
            ctx,
            deferred,
            close,
        } = self;
        if let Some(e) = deferred {
            return Err(e);
        }
        let terminal = graph.link(stage, op.name(), StageKind::Terminal, op.flags(), false)?;
        graph.consume(terminal)?;
        tracing::debug!(
            terminal = op.name(),
            stages = graph.len(),
            parallel = ctx.is_parallel(),
            stateful = graph.stateful_boundaries(terminal).len(),
            flags = ?graph.combined_flags(terminal),
            "evaluating pipeline"
        );

        let result = ctx.install(|| {
            let policy = ctx.policy();
            let seg = FlaggedSegment::wrap(head.open(&ctx, &policy)?, op.flags());
            if ctx.is_parallel() {
                op.evaluate_parallel(seg, &policy)
            } else {
                op.evaluate_sequential(seg)
            }
        });
        drop(close);
        result
    }

    /// Hand the remaining elements out as a cursor. Close actions run when
    /// the cursor is dropped.
    pub fn cursor(self) -> Result<BoxCursor<T>> {
        let Pipeline {
            mut graph,
            stage,
            head,
            ctx,
            deferred,
            close,
        } = self;
        if let Some(e) = deferred {
            return Err(e);
        }
        graph.consume(stage)?;
        let seg = ctx.install(|| {
            let policy = ctx.policy();
            head.open(&ctx, &policy)
        })?;
        Ok(Box::new(GuardedCursor {
            inner: Box::new(WrappingCursor::new(seg)),
            _close: close,
        }))
    }

    pub fn for_each<F>(self, f: F) -> Result<()>
    where
        F: Fn(T) + Send + Sync,
    {
        self.evaluate(ForEachOp::new(f))
    }

    /// Like `for_each`, but `f` sees elements in encounter order, one at a time.
    pub fn for_each_ordered<F>(self, f: F) -> Result<()>
    where
        F: Fn(T) + Send + Sync,
    {
        self.evaluate(ForEachOrderedOp::new(f))
    }

    /// Fold with an associative `op` whose identity is `identity`.
    pub fn reduce<F>(self, identity: T, op: F) -> Result<T>
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Send + Sync,
    {
        self.evaluate(ReduceOp::new(identity, op))
    }

    pub fn reduce_with<F>(self, op: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        self.evaluate(ReduceWithOp::new(op))
    }

    pub fn fold<U, A, C>(self, identity: U, accumulate: A, combine: C) -> Result<U>
    where
        U: Clone + Send + Sync,
        A: Fn(U, T) -> U + Send + Sync,
        C: Fn(U, U) -> U + Send + Sync,
    {
        self.evaluate(FoldOp::new(identity, accumulate, combine))
    }

    /// Mutable reduction into containers made by `supplier`.
    pub fn collect_with<R, S, A, C>(self, supplier: S, accumulate: A, combine: C) -> Result<R>
    where
        R: Send,
        S: Fn() -> R + Send + Sync,
        A: Fn(&mut R, T) + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        self.evaluate(CollectWithOp::new(supplier, accumulate, combine))
    }

    pub fn count(self) -> Result<u64> {
        self.evaluate(CountOp)
    }

    pub fn to_node(self) -> Result<Node<T>> {
        self.evaluate(ToNodeOp)
    }

    pub fn to_vec(self) -> Result<Vec<T>> {
        self.to_node()?.into_vec()
    }

    pub fn find_first(self) -> Result<Option<T>>
    where
        T: Sync,
    {
        self.evaluate(FindOp::first())
    }

    pub fn find_any(self) -> Result<Option<T>>
    where
        T: Sync,
    {
        self.evaluate(FindOp::any())
    }

    pub fn any_match<P>(self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.evaluate(MatchOp::new(MatchKind::Any, pred))
    }

    pub fn all_match<P>(self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.evaluate(MatchOp::new(MatchKind::All, pred))
    }

    pub fn none_match<P>(self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        self.evaluate(MatchOp::new(MatchKind::None, pred))
    }

    /// Smallest element by `cmp`; the first of equal minima wins.
    pub fn min_by<C>(self, cmp: C) -> Result<Option<T>>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        self.reduce_with(move |a, b| if cmp(&b, &a) == Ordering::Less { b } else { a })
    }

    /// Largest element by `cmp`; the first of equal maxima wins.
    pub fn max_by<C>(self, cmp: C) -> Result<Option<T>>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        self.reduce_with(move |a, b| if cmp(&b, &a) == Ordering::Greater { b } else { a })
    }
}

impl<T: Ord + Send + 'static> Pipeline<T> {
    pub fn sorted(self) -> Self {
        self.chain(SortOp::<T, fn(&T, &T) -> Ordering>::natural())
    }

    pub fn min(self) -> Result<Option<T>> {
        self.min_by(T::cmp)
    }

    pub fn max(self) -> Result<Option<T>> {
        self.max_by(T::cmp)
    }
}

impl<T: Numeric> Pipeline<T> {
    pub fn sum(self) -> Result<T> {
        self.reduce(T::zero(), |a, b| a + b)
    }
}

impl<T: Send + 'static> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stage", &self.stage)
            .field("flags", &self.flags())
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

struct GuardedCursor<T> {
    inner: BoxCursor<T>,
    _close: CloseGuard,
}

impl<T: Send + 'static> Cursor<T> for GuardedCursor<T> {
    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> bool {
        self.inner.try_advance(action)
    }

    fn for_each_remaining(&mut self, action: &mut dyn FnMut(T)) {
        self.inner.for_each_remaining(action)
    }

    fn try_split(&mut self) -> Option<BoxCursor<T>> {
        self.inner.try_split()
    }

    fn estimate_size(&self) -> u64 {
        self.inner.estimate_size()
    }

    fn characteristics(&self) -> Characteristics {
        self.inner.characteristics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    fn pool(threads: usize) -> Arc<ThreadPool> {
        Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn map_filter_to_vec_sequential_and_parallel() {
        let input: Vec<i32> = (0..1000).collect();
        let expected: Vec<i32> = input.iter().map(|x| x * 3).filter(|x| x % 2 == 0).collect();

        let seq = Pipeline::from_vec(input.clone())
            .map(|x| x * 3)
            .filter(|x| x % 2 == 0)
            .to_vec()
            .unwrap();
        assert_eq!(seq, expected);

        let par = Pipeline::from_vec(input)
            .on_pool(pool(4))
            .map(|x| x * 3)
            .filter(|x| x % 2 == 0)
            .to_vec()
            .unwrap();
        assert_eq!(par, expected);
    }

    #[test]
    fn flags_track_stages() {
        let p = Pipeline::from_vec(vec![3, 1, 2]);
        assert!(p.flags().is_known(Property::Sized));
        assert!(p.flags().is_known(Property::Ordered));
        let p = p.sorted();
        assert!(p.flags().is_known(Property::Sorted));
        let p = p.filter(|x| *x > 1);
        assert!(p.flags().is_known_false(Property::Sized));
        assert!(p.flags().is_known(Property::Sorted));
        let p = p.unordered();
        assert!(p.flags().is_known_false(Property::Ordered));
        assert_eq!(p.stages().len(), 4);
        // already unordered: no new stage
        assert_eq!(p.unordered().stages().len(), 4);
    }

    #[test]
    fn stateful_chain_parallel_matches_sequential() {
        let input: Vec<i64> = (0..5000).map(|i| (i * 7919) % 1013).collect();
        let run = |p: Pipeline<i64>| {
            p.filter(|x| x % 3 != 0)
                .sorted()
                .distinct()
                .skip(10)
                .limit(100)
                .map(|x| x * 2)
                .to_vec()
                .unwrap()
        };
        let seq = run(Pipeline::from_vec(input.clone()));
        let par = run(Pipeline::from_vec(input).on_pool(pool(3)));
        assert_eq!(seq.len(), 100);
        assert_eq!(seq, par);
    }

    #[test]
    fn terminals() {
        let p = || Pipeline::from_vec(vec![4, 9, 1, 9, 2]);
        assert_eq!(p().count().unwrap(), 5);
        assert_eq!(p().sum().unwrap(), 25);
        assert_eq!(p().min().unwrap(), Some(1));
        assert_eq!(p().max().unwrap(), Some(9));
        assert_eq!(p().reduce_with(|a, b| a * b).unwrap(), Some(648));
        assert_eq!(p().fold(0usize, |n, _| n + 1, |a, b| a + b).unwrap(), 5);
        assert!(p().any_match(|x| *x == 2).unwrap());
        assert!(!p().all_match(|x| *x > 1).unwrap());
        assert!(p().none_match(|x| *x > 9).unwrap());
        assert_eq!(p().find_first().unwrap(), Some(4));
        assert_eq!(Pipeline::<i32>::empty().find_any().unwrap(), None);
        let joined = p()
            .collect_with(Vec::new, |v: &mut Vec<i32>, x| v.push(x), |mut a, mut b| {
                a.append(&mut b);
                a
            })
            .unwrap();
        assert_eq!(joined, vec![4, 9, 1, 9, 2]);
    }

    #[test]
    fn min_and_max_keep_first_of_ties() {
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        let by_key = |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0);
        assert_eq!(
            Pipeline::from_vec(items.clone()).min_by(by_key).unwrap(),
            Some((1, 'b'))
        );
        assert_eq!(
            Pipeline::from_vec(items).max_by(by_key).unwrap(),
            Some((2, 'a'))
        );
    }

    #[test]
    fn for_each_ordered_sees_encounter_order() {
        let seen = Mutex::new(Vec::new());
        Pipeline::from_vec((0..2000).collect::<Vec<u32>>())
            .on_pool(pool(4))
            .map(|x| x + 1)
            .for_each_ordered(|x| seen.lock().unwrap().push(x))
            .unwrap();
        assert_eq!(seen.into_inner().unwrap(), (1..=2000).collect::<Vec<_>>());
    }

    #[test]
    fn iterator_and_supplier_sources() {
        let v = Pipeline::from_iterator((0..100u32).map(|x| x * x))
            .on_pool(pool(2))
            .filter(|x| x % 2 == 1)
            .to_vec()
            .unwrap();
        assert_eq!(v, (0..100u32).map(|x| x * x).filter(|x| x % 2 == 1).collect::<Vec<_>>());

        let opened = Arc::new(AtomicUsize::new(0));
        let o = opened.clone();
        let p = Pipeline::from_supplier(Characteristics::ORDERED | Characteristics::SIZED, move || {
            o.fetch_add(1, AtomicOrdering::SeqCst);
            Box::new(ArrayCursor::new(vec![1, 2, 3])) as BoxCursor<i32>
        })
        .map(|x| x + 1);
        assert_eq!(opened.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(p.to_vec().unwrap(), vec![2, 3, 4]);
        assert_eq!(opened.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn concat_keeps_order_and_close_actions() {
        let closed = Arc::new(AtomicUsize::new(0));
        let (c1, c2) = (closed.clone(), closed.clone());
        let a = Pipeline::from_vec(vec![1, 2, 3]).on_close(move || {
            c1.fetch_add(1, AtomicOrdering::SeqCst);
        });
        let b = Pipeline::from_vec(vec![4, 5]).map(|x| x * 10).on_close(move || {
            c2.fetch_add(1, AtomicOrdering::SeqCst);
        });
        let joined = Pipeline::concat(a, b);
        assert!(joined.flags().is_known(Property::Ordered));
        assert_eq!(joined.to_vec().unwrap(), vec![1, 2, 3, 40, 50]);
        assert_eq!(closed.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn close_runs_actions_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let c = closed.clone();
        Pipeline::from_vec(vec![1])
            .on_close(move || {
                c.fetch_add(1, AtomicOrdering::SeqCst);
            })
            .close();
        assert_eq!(closed.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn cursor_hands_out_remaining_elements() {
        let closed = Arc::new(AtomicUsize::new(0));
        let c = closed.clone();
        let mut cursor = Pipeline::from_vec(vec![5, 6, 7])
            .map(|x| x - 5)
            .on_close(move || {
                c.fetch_add(1, AtomicOrdering::SeqCst);
            })
            .cursor()
            .unwrap();
        let mut got = Vec::new();
        cursor.for_each_remaining(&mut |x| got.push(x));
        assert_eq!(got, vec![0, 1, 2]);
        assert_eq!(closed.load(AtomicOrdering::SeqCst), 0);
        drop(cursor);
        assert_eq!(closed.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn invalid_config_surfaces_at_terminal() {
        let cfg = EngineConfig {
            leaf_target_factor: 0,
            ..EngineConfig::default()
        };
        let err = Pipeline::from_vec(vec![1, 2]).with_config(cfg).count().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
