//! Stage and task identifiers.
//!
//! `StageId` is a position in a pipeline's stage arena. `TaskId` names one
//! task of a single evaluation; ids are unique per [`TaskIds`] counter only.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            /// Arena slot for this id.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Index of a stage record in a stage graph.
    StageId,
    "stage"
);
id_type!(TaskId, "task");

impl TaskId {
    /// Id of the root of every task tree.
    pub const ROOT: TaskId = TaskId(0);
}

/// Shared counter handing out task ids after [`TaskId::ROOT`].
#[derive(Debug)]
pub struct TaskIds(AtomicU64);

impl TaskIds {
    pub fn new() -> Self {
        Self(AtomicU64::new(TaskId::ROOT.0 + 1))
    }

    pub fn next(&self) -> TaskId {
        TaskId(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TaskIds {
    fn default() -> Self {
        Self::new()
    }
}
