//! Stage graph: an arena of stage records addressed by `StageId`.
//!
//! A pipeline appends one record per operation. Linking a stage moves its
//! upstream from `Open` to `Linked`; evaluating a terminal or taking a cursor
//! moves the whole chain to `Consumed`. A stage that is not `Open` can be
//! neither linked nor consumed again.

use sluice_core::error::{Error, Result};
use sluice_core::flags::StreamFlags;
use sluice_core::id::StageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Source,
    Intermediate,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Open,
    Linked,
    Consumed,
}

#[derive(Debug, Clone)]
pub struct StageRecord {
    pub id: StageId,
    pub name: &'static str,
    pub kind: StageKind,
    pub upstream: Option<StageId>,
    pub downstream: Option<StageId>,
    /// Flags this stage sets or clears.
    pub op_flags: StreamFlags,
    /// `op_flags` folded over the upstream's combined flags.
    pub combined_flags: StreamFlags,
    /// Distance from the source.
    pub depth: u32,
    pub stateful: bool,
    pub state: LinkState,
}

#[derive(Debug, Default, Clone)]
pub struct StageGraph {
    stages: Vec<StageRecord>,
}

impl StageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, id: StageId) -> Option<&StageRecord> {
        self.stages.get(id.index())
    }

    fn get_mut(&mut self, id: StageId) -> Result<&mut StageRecord> {
        self.stages
            .get_mut(id.index())
            .ok_or_else(|| Error::IllegalArgument(format!("unknown stage {id}")))
    }

    fn next_id(&self) -> StageId {
        StageId::new(self.stages.len() as u64)
    }

    /// Add a source stage. `flags` are the source's definitive properties.
    pub fn add_source(&mut self, name: &'static str, flags: StreamFlags) -> StageId {
        let id = self.next_id();
        self.stages.push(StageRecord {
            id,
            name,
            kind: StageKind::Source,
            upstream: None,
            downstream: None,
            op_flags: flags,
            combined_flags: flags.combine(StreamFlags::INITIAL),
            depth: 0,
            stateful: false,
            state: LinkState::Open,
        });
        id
    }

    /// Link a new stage downstream of `upstream`.
    pub fn link(
        &mut self,
        upstream: StageId,
        name: &'static str,
        kind: StageKind,
        op_flags: StreamFlags,
        stateful: bool,
    ) -> Result<StageId> {
        let id = self.next_id();
        let up = self.get_mut(upstream)?;
        if up.state != LinkState::Open {
            return Err(Error::StageConsumed {
                stage: up.name.to_string(),
            });
        }
        up.state = LinkState::Linked;
        up.downstream = Some(id);
        let combined_flags = op_flags.combine(up.combined_flags);
        let depth = up.depth + 1;
        self.stages.push(StageRecord {
            id,
            name,
            kind,
            upstream: Some(upstream),
            downstream: None,
            op_flags,
            combined_flags,
            depth,
            stateful,
            state: LinkState::Open,
        });
        Ok(id)
    }

    /// Mark the chain ending at `id` as consumed.
    pub fn consume(&mut self, id: StageId) -> Result<()> {
        let last = self.get_mut(id)?;
        if last.state != LinkState::Open {
            return Err(Error::StageConsumed {
                stage: last.name.to_string(),
            });
        }
        let mut cur = Some(id);
        while let Some(sid) = cur {
            let rec = self.get_mut(sid)?;
            rec.state = LinkState::Consumed;
            cur = rec.upstream;
        }
        Ok(())
    }

    pub fn combined_flags(&self, id: StageId) -> StreamFlags {
        self.get(id)
            .map_or(StreamFlags::INITIAL, |r| r.combined_flags)
    }

    /// Records from the source to `id`, in order.
    pub fn chain(&self, id: StageId) -> Vec<&StageRecord> {
        let mut out = Vec::new();
        let mut cur = self.get(id);
        while let Some(rec) = cur {
            out.push(rec);
            cur = rec.upstream.and_then(|u| self.get(u));
        }
        out.reverse();
        out
    }

    /// Stateful stages on the chain ending at `id`, where parallel evaluation
    /// materializes.
    pub fn stateful_boundaries(&self, id: StageId) -> Vec<StageId> {
        self.chain(id)
            .into_iter()
            .filter(|r| r.stateful)
            .map(|r| r.id)
            .collect()
    }

    /// Append another graph's records, renumbering them. Returns the new id
    /// of `other`'s stage `tail`.
    pub fn absorb(&mut self, other: StageGraph, tail: StageId) -> StageId {
        let offset = self.stages.len() as u64;
        let shift = |id: StageId| StageId::new(id.get() + offset);
        for mut rec in other.stages {
            rec.id = shift(rec.id);
            rec.upstream = rec.upstream.map(shift);
            rec.downstream = rec.downstream.map(shift);
            self.stages.push(rec);
        }
        shift(tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::flags::{Characteristics, Property};

    fn source(g: &mut StageGraph) -> StageId {
        g.add_source(
            "vec",
            StreamFlags::from_characteristics(Characteristics::ORDERED | Characteristics::SIZED),
        )
    }

    #[test]
    fn link_folds_flags_and_depth() {
        let mut g = StageGraph::new();
        let s = source(&mut g);
        let f = g
            .link(s, "filter", StageKind::Intermediate, StreamFlags::NOT_SIZED, false)
            .unwrap();
        let rec = g.get(f).unwrap();
        assert_eq!(rec.depth, 1);
        assert!(rec.combined_flags.is_known(Property::Ordered));
        assert!(rec.combined_flags.is_known_false(Property::Sized));
        assert_eq!(g.get(s).unwrap().downstream, Some(f));
        assert_eq!(g.get(s).unwrap().state, LinkState::Linked);
    }

    #[test]
    fn relinking_a_linked_stage_fails() {
        let mut g = StageGraph::new();
        let s = source(&mut g);
        g.link(s, "map", StageKind::Intermediate, StreamFlags::EMPTY, false)
            .unwrap();
        let err = g
            .link(s, "filter", StageKind::Intermediate, StreamFlags::EMPTY, false)
            .unwrap_err();
        assert_eq!(
            err,
            Error::StageConsumed {
                stage: "vec".into()
            }
        );
    }

    #[test]
    fn consuming_twice_fails() {
        let mut g = StageGraph::new();
        let s = source(&mut g);
        let m = g
            .link(s, "map", StageKind::Intermediate, StreamFlags::EMPTY, false)
            .unwrap();
        g.consume(m).unwrap();
        assert!(matches!(g.consume(m), Err(Error::StageConsumed { .. })));
        assert!(matches!(
            g.link(m, "filter", StageKind::Intermediate, StreamFlags::EMPTY, false),
            Err(Error::StageConsumed { .. })
        ));
        assert_eq!(g.get(s).unwrap().state, LinkState::Consumed);
    }

    #[test]
    fn chain_and_boundaries() {
        let mut g = StageGraph::new();
        let s = source(&mut g);
        let a = g
            .link(s, "sorted", StageKind::Intermediate, StreamFlags::IS_SORTED, true)
            .unwrap();
        let b = g
            .link(a, "map", StageKind::Intermediate, StreamFlags::NOT_SORTED, false)
            .unwrap();
        let names: Vec<_> = g.chain(b).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["vec", "sorted", "map"]);
        assert_eq!(g.stateful_boundaries(b), vec![a]);
    }
}
