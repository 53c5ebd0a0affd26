//! EdgeCostModel (§4.2): the static per-edge-kind classification table, plus
//! the simple (non schedule-search) time-delta formulas. `Board`/`Alight`
//! deltas are *not* computed here - finding the earliest (or, in reverse,
//! latest) feasible event is a search over a stop's sorted event list, which
//! is `GraphExplorer`'s job (explorer.rs); this module only answers "is this
//! edge kind a transfer boundary", "does it count as walking", and so on.

use super::EdgeKind;

/// The fixed facts about a `kind` from the §4.2 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeClass {
    /// Crossing this edge counts as a boarding (a `nTransfers` increment).
    pub is_transfer_boundary: bool,
    /// Crossing this edge accumulates into `walkDistanceOnCurrentLeg`.
    pub counts_walk_distance: bool,
    /// Crossing this edge accumulates into `transferWalkDistanceOnCurrentLeg`
    /// instead of the plain walk budget (precomputed `TRANSFER` edges only).
    pub counts_transfer_walk_distance: bool,
    /// The per-leg walk budget resets to zero on crossing this edge.
    pub resets_leg: bool,
}

const NON_WALK: EdgeClass = EdgeClass {
    is_transfer_boundary: false,
    counts_walk_distance: false,
    counts_transfer_walk_distance: false,
    resets_leg: false,
};

pub fn classify(kind: EdgeKind) -> EdgeClass {
    match kind {
        EdgeKind::Highway => EdgeClass { counts_walk_distance: true, ..NON_WALK },
        EdgeKind::EnterPt | EdgeKind::ExitPt => EdgeClass { resets_leg: true, ..NON_WALK },
        EdgeKind::EnterTimeExpandedNetwork | EdgeKind::LeaveTimeExpandedNetwork => NON_WALK,
        EdgeKind::StopNodeMarker | EdgeKind::StopEnterNode | EdgeKind::StopExitNode => NON_WALK,
        EdgeKind::Board => EdgeClass {
            is_transfer_boundary: true,
            resets_leg: true,
            ..NON_WALK
        },
        EdgeKind::Alight => EdgeClass { resets_leg: true, ..NON_WALK },
        EdgeKind::Hop | EdgeKind::Dwell | EdgeKind::Overnight => NON_WALK,
        EdgeKind::Transfer => EdgeClass { counts_transfer_walk_distance: true, ..NON_WALK },
        EdgeKind::Wait | EdgeKind::WaitArrival => NON_WALK,
    }
}

/// Fixed day-rollover penalty for an `OVERNIGHT` edge (§4.2).
pub const OVERNIGHT_SECONDS: i64 = 86_400;

/// Time delta for edge kinds whose formula does not depend on a schedule
/// search: `HIGHWAY`/`TRANSFER` (distance over walking speed), the zero-cost
/// boundary crossings, fixed-duration `HOP`/`DWELL`, and `OVERNIGHT`.
///
/// Returns `None` for `Board`/`Alight`/`Wait`/`WaitArrival`, whose delta is
/// schedule-dependent and computed by `GraphExplorer`.
pub fn simple_time_delta(kind: EdgeKind, stored_time: i64, distance_m: f64, walk_speed_mps: f64) -> Option<i64> {
    match kind {
        EdgeKind::Highway | EdgeKind::Transfer => {
            if walk_speed_mps <= 0.0 {
                Some(i64::MAX / 2)
            } else {
                Some((distance_m / walk_speed_mps).ceil() as i64)
            }
        }
        EdgeKind::EnterPt
        | EdgeKind::ExitPt
        | EdgeKind::EnterTimeExpandedNetwork
        | EdgeKind::LeaveTimeExpandedNetwork
        | EdgeKind::StopNodeMarker
        | EdgeKind::StopEnterNode
        | EdgeKind::StopExitNode
        | EdgeKind::Alight => Some(0),
        EdgeKind::Hop | EdgeKind::Dwell => Some(stored_time),
        EdgeKind::Overnight => Some(OVERNIGHT_SECONDS),
        EdgeKind::Board | EdgeKind::Wait | EdgeKind::WaitArrival => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_is_the_only_transfer_boundary() {
        for kind in [
            EdgeKind::Highway,
            EdgeKind::EnterPt,
            EdgeKind::ExitPt,
            EdgeKind::Hop,
            EdgeKind::Dwell,
            EdgeKind::Alight,
            EdgeKind::Transfer,
            EdgeKind::Overnight,
            EdgeKind::Wait,
            EdgeKind::WaitArrival,
        ] {
            assert!(!classify(kind).is_transfer_boundary, "{kind:?} should not be a transfer boundary");
        }
        assert!(classify(EdgeKind::Board).is_transfer_boundary);
    }

    #[test]
    fn highway_time_scales_with_speed() {
        let fast = simple_time_delta(EdgeKind::Highway, 0, 1000.0, 2.0).unwrap();
        let slow = simple_time_delta(EdgeKind::Highway, 0, 1000.0, 1.0).unwrap();
        assert!(slow > fast);
    }

    #[test]
    fn overnight_is_exactly_one_day() {
        assert_eq!(simple_time_delta(EdgeKind::Overnight, 0, 0.0, 1.0).unwrap(), OVERNIGHT_SECONDS);
    }
}
