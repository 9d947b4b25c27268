//! Encounter-ordered side effects over a parallel task tree.
//!
//! Every task knows its left predecessor: the task whose completion means
//! every element before it has been emitted. When a task splits, the left
//! child inherits the parent's predecessor and the right child's
//! predecessor is the left child. A task also carries the ids it completes
//! when its last leaf finishes (itself plus every ancestor whose rightmost
//! descendant it is).
//!
//! A leaf whose predecessor is done emits straight to the caller. Any other
//! leaf buffers its output and parks it under its predecessor's id; the leaf
//! that completes that predecessor emits the buffer on its behalf.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use sluice_core::id::{TaskId, TaskIds};

use crate::schedule::{SplitPolicy, Splittable};

pub struct OrderedSpec<D, B, E> {
    /// Traverse a ready piece, emitting its elements directly.
    pub emit_direct: D,
    /// Traverse a piece that is not ready yet into a buffer.
    pub buffer: B,
    /// Emit a previously buffered piece.
    pub emit_buffer: E,
}

struct Task {
    pred: Option<TaskId>,
    completes: Vec<TaskId>,
}

struct Parked<Buf> {
    completes: Vec<TaskId>,
    buffer: Buf,
}

struct State<Buf> {
    done: HashSet<TaskId>,
    waiting: HashMap<TaskId, Parked<Buf>>,
}

struct Shared<Buf> {
    ids: TaskIds,
    threshold: u64,
    state: Mutex<State<Buf>>,
}

impl<Buf> Shared<Buf> {
    fn is_ready(&self, pred: Option<TaskId>) -> bool {
        pred.map_or(true, |p| self.state.lock().done.contains(&p))
    }
}

/// Run a task tree whose leaves emit in encounter order.
pub fn run_ordered<P, Buf, D, B, E>(piece: P, policy: &SplitPolicy, spec: &OrderedSpec<D, B, E>)
where
    P: Splittable,
    Buf: Send,
    D: Fn(P) + Sync,
    B: Fn(P) -> Buf + Sync,
    E: Fn(Buf) + Sync,
{
    let shared = Shared {
        ids: TaskIds::new(),
        threshold: policy.target_size(piece.estimate_size()),
        state: Mutex::new(State {
            done: HashSet::new(),
            waiting: HashMap::new(),
        }),
    };
    let root = Task {
        pred: None,
        completes: vec![TaskId::ROOT],
    };
    compute(piece, root, 0, spec, &shared);
    debug_assert!(shared.state.lock().waiting.is_empty());
}

fn compute<P, Buf, D, B, E>(
    mut piece: P,
    task: Task,
    depth: u32,
    spec: &OrderedSpec<D, B, E>,
    shared: &Shared<Buf>,
) where
    P: Splittable,
    Buf: Send,
    D: Fn(P) + Sync,
    B: Fn(P) -> Buf + Sync,
    E: Fn(Buf) + Sync,
{
    if piece.estimate_size() > shared.threshold {
        if let Some(prefix) = piece.try_split() {
            let left_id = shared.ids.next();
            let right_id = shared.ids.next();
            let left = Task {
                pred: task.pred,
                completes: vec![left_id],
            };
            let mut completes = Vec::with_capacity(task.completes.len() + 1);
            completes.push(right_id);
            completes.extend(task.completes);
            let right = Task {
                pred: Some(left_id),
                completes,
            };
            if depth % 2 == 0 {
                rayon::join(
                    || compute(prefix, left, depth + 1, spec, shared),
                    || compute(piece, right, depth + 1, spec, shared),
                );
            } else {
                rayon::join(
                    || compute(piece, right, depth + 1, spec, shared),
                    || compute(prefix, left, depth + 1, spec, shared),
                );
            }
            return;
        }
    }

    if shared.is_ready(task.pred) {
        (spec.emit_direct)(piece);
        complete(task.completes, spec, shared);
        return;
    }

    let buffer = (spec.buffer)(piece);
    let parked = {
        let mut state = shared.state.lock();
        match task.pred {
            Some(p) if !state.done.contains(&p) => {
                state.waiting.insert(
                    p,
                    Parked {
                        completes: task.completes,
                        buffer,
                    },
                );
                None
            }
            _ => Some((task.completes, buffer)),
        }
    };
    // The predecessor finished while we were buffering.
    if let Some((completes, buffer)) = parked {
        (spec.emit_buffer)(buffer);
        complete(completes, spec, shared);
    }
}

/// Mark `completes` done and emit every parked leaf that becomes ready as a
/// result, in order.
fn complete<Buf, D, B, E>(mut completes: Vec<TaskId>, spec: &OrderedSpec<D, B, E>, shared: &Shared<Buf>)
where
    E: Fn(Buf),
{
    loop {
        let released = {
            let mut state = shared.state.lock();
            let mut released = None;
            for id in &completes {
                state.done.insert(*id);
                if released.is_none() {
                    released = state.waiting.remove(id);
                }
            }
            released
        };
        match released {
            Some(parked) => {
                (spec.emit_buffer)(parked.buffer);
                completes = parked.completes;
            }
            None => return,
        }
    }
}
