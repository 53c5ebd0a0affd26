//! `Label` (§3) and the arena/Pareto-front machinery `LabelSetting` builds
//! on. Grounded on the teacher's own back-pointer reconstruction in
//! `journey.rs` (`Journey::from_raptor`, which walks a predecessor chain),
//! generalized from RAPTOR's round-indexed bookkeeping to the arena +
//! parent-index scheme §9 calls for ("arena-allocated labels with stable
//! indices ... dropped wholesale at query end").

use crate::graph::{EdgeKind, Instant, NodeId, TripId};

pub type LabelIdx = u32;

/// The single mutable object of the search (§3).
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub time: Instant,
    pub node: NodeId,
    /// The kind of edge crossed to reach this label from its parent, and its
    /// own (non-accumulated) distance - `TripReconstruction` needs both to
    /// classify legs; `node`'s `NodeKind` alone usually already carries the
    /// trip, except for a `FeedOverlay` extra edge, which has no
    /// `TripDeparture`/`TripArrival` node pair of its own and so stamps its
    /// trip here instead (see `incoming_trip`).
    pub incoming_kind: Option<EdgeKind>,
    pub incoming_distance_m: f64,
    /// The trip the incoming edge itself carried, if any (`ExplorerEdge::trip`).
    /// `None` for ordinary scheduled edges, whose trip `TripReconstruction`
    /// instead reads off the endpoint node's `NodeKind`.
    pub incoming_trip: Option<TripId>,
    pub n_transfers: u32,
    pub walk_distance_on_current_leg: f64,
    pub transfer_walk_distance_on_current_leg: f64,
    pub first_pt_departure_time: Option<Instant>,
    pub parent: Option<LabelIdx>,
}

impl Label {
    pub fn root(time: Instant, node: NodeId) -> Self {
        Self {
            time,
            node,
            incoming_kind: None,
            incoming_distance_m: 0.0,
            incoming_trip: None,
            n_transfers: 0,
            walk_distance_on_current_leg: 0.0,
            transfer_walk_distance_on_current_leg: 0.0,
            first_pt_departure_time: None,
            parent: None,
        }
    }

    /// Whether `self` dominates `other` at the same node (§3): weakly better
    /// on every criterion in play, strictly better on at least one.
    /// `reverse` flips the direction "better" means for `time`; `ignore_transfers`
    /// drops `n_transfers` from the comparison per the §4.3 hint of that name.
    pub fn dominates(&self, other: &Label, reverse: bool, ignore_transfers: bool) -> bool {
        let time_better_or_eq = if reverse { self.time >= other.time } else { self.time <= other.time };
        if !time_better_or_eq {
            return false;
        }
        if !ignore_transfers && self.n_transfers > other.n_transfers {
            return false;
        }
        if self.walk_distance_on_current_leg > other.walk_distance_on_current_leg {
            return false;
        }
        if self.transfer_walk_distance_on_current_leg > other.transfer_walk_distance_on_current_leg {
            return false;
        }

        let time_strictly_better = if reverse { self.time > other.time } else { self.time < other.time };
        time_strictly_better
            || (!ignore_transfers && self.n_transfers < other.n_transfers)
            || self.walk_distance_on_current_leg < other.walk_distance_on_current_leg
            || self.transfer_walk_distance_on_current_leg < other.transfer_walk_distance_on_current_leg
    }
}

/// Arena of labels for a single query, addressed by stable index. Dropped
/// wholesale (with the rest of the per-query state) when the query ends.
#[derive(Default)]
pub struct LabelArena {
    labels: Vec<Label>,
}

impl LabelArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: Label) -> LabelIdx {
        let idx = self.labels.len() as LabelIdx;
        self.labels.push(label);
        idx
    }

    pub fn get(&self, idx: LabelIdx) -> &Label {
        &self.labels[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Walks `idx`'s parent chain back to the root, returning labels in
    /// root-to-`idx` order.
    pub fn reconstruct(&self, idx: LabelIdx) -> Vec<LabelIdx> {
        let mut chain = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            chain.push(i);
            current = self.get(i).parent;
        }
        chain.reverse();
        chain
    }
}

/// The non-dominated labels currently open or closed at one node (§3: "at
/// most one label per `(node, criterion-vector)` equivalence class").
#[derive(Default)]
pub struct ParetoFront {
    members: Vec<LabelIdx>,
}

impl ParetoFront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[LabelIdx] {
        &self.members
    }

    /// Attempts to insert `candidate` (already pushed into `arena` at
    /// `candidate_idx`). Returns `true` if it was inserted - i.e. not
    /// dominated by an existing member - evicting any members it in turn
    /// dominates. Ties (neither dominates the other) are both kept only
    /// when `profile_query` is set, matching §4.3's tie-break rule.
    pub fn try_insert(
        &mut self,
        arena: &LabelArena,
        candidate_idx: LabelIdx,
        reverse: bool,
        ignore_transfers: bool,
        profile_query: bool,
    ) -> bool {
        let candidate = *arena.get(candidate_idx);

        for &existing_idx in &self.members {
            let existing = arena.get(existing_idx);
            if existing.dominates(&candidate, reverse, ignore_transfers) {
                return false;
            }
            let candidate_wins = candidate.dominates(existing, reverse, ignore_transfers);
            if !profile_query && !candidate_wins {
                // Neither dominates the other outside profile mode: the incumbent
                // wins ties, per §4.3 ("kept only if profile_query is set").
                return false;
            }
        }

        self.members.retain(|&idx| !candidate.dominates(arena.get(idx), reverse, ignore_transfers));
        self.members.push(candidate_idx);
        true
    }
}
