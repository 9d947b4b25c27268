//! Task tree nodes used for cancellation and leftmost tests.
//!
//! Children point at their parent, never the other way round. A left child
//! additionally holds its right sibling's cancel flag so that it can cancel
//! everything after it in encounter order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sluice_core::id::{TaskId, TaskIds};

#[derive(Debug)]
pub struct TaskNode {
    id: TaskId,
    parent: Option<Arc<TaskNode>>,
    depth: u32,
    cancelled: Arc<AtomicBool>,
    /// Right sibling's cancel flag; `Some` only for left children.
    later_sibling: Option<Arc<AtomicBool>>,
    ids: Arc<TaskIds>,
}

impl TaskNode {
    pub fn root() -> Arc<TaskNode> {
        Arc::new(TaskNode {
            id: TaskId::ROOT,
            parent: None,
            depth: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
            later_sibling: None,
            ids: Arc::new(TaskIds::new()),
        })
    }

    /// Create the two children of a split, in encounter order.
    pub fn fork(self: &Arc<Self>) -> (Arc<TaskNode>, Arc<TaskNode>) {
        let right_flag = Arc::new(AtomicBool::new(false));
        let child = |cancelled: Arc<AtomicBool>, later_sibling: Option<Arc<AtomicBool>>| {
            Arc::new(TaskNode {
                id: self.ids.next(),
                parent: Some(Arc::clone(self)),
                depth: self.depth + 1,
                cancelled,
                later_sibling,
                ids: Arc::clone(&self.ids),
            })
        };
        let left = child(Arc::new(AtomicBool::new(false)), Some(Arc::clone(&right_flag)));
        let right = child(right_flag, None);
        (left, right)
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// True when no task precedes this one in encounter order: every node on
    /// the path to the root is a left child.
    pub fn is_leftmost(&self) -> bool {
        let mut node = self;
        while let Some(parent) = &node.parent {
            if node.later_sibling.is_none() {
                return false;
            }
            node = parent;
        }
        true
    }

    /// Cancel every task that follows this one in encounter order.
    pub fn cancel_later_nodes(&self) {
        let mut node = Some(self);
        while let Some(n) = node {
            if let Some(flag) = &n.later_sibling {
                flag.store(true, Ordering::Release);
            }
            node = n.parent.as_deref();
        }
    }

    /// True when this task or any ancestor was cancelled.
    pub fn is_cancelled(&self) -> bool {
        let mut node = Some(self);
        while let Some(n) = node {
            if n.cancelled.load(Ordering::Acquire) {
                return true;
            }
            node = n.parent.as_deref();
        }
        false
    }
}
