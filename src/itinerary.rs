//! `TripReconstruction` (§4.6): turns a terminal label's parent chain into an
//! ordered list of legs. Grounded on the teacher's `Journey::from_raptor`
//! (`journey.rs`), which walks a predecessor chain and coalesces consecutive
//! boarding events into one ride; generalized to the arena/parent-index
//! scheme and to a three-way leg split (walk / transfer / ride) instead of
//! RAPTOR's boarding-count rounds.

use crate::graph::{BaseGraph, EdgeKind, GeoPoint, Instant, NodeId, NodeKind, RouteId, StopId, TripId};
use crate::label::{LabelArena, LabelIdx};
use crate::overlay::FeedOverlay;
use crate::query_graph::QueryGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegKind {
    Walk,
    Transfer,
    Ride,
    /// A zero-cost hub-entry/-exit crossing (`ENTER_PT`, `EXIT_PT`, ...) -
    /// never surfaced as its own leg, always folded into a neighbor.
    Boundary,
}

fn classify_leg_kind(kind: EdgeKind) -> LegKind {
    match kind {
        EdgeKind::Highway => LegKind::Walk,
        EdgeKind::Transfer => LegKind::Transfer,
        EdgeKind::Board | EdgeKind::Hop | EdgeKind::Dwell | EdgeKind::Alight => LegKind::Ride,
        _ => LegKind::Boundary,
    }
}

fn node_trip(kind: NodeKind) -> Option<TripId> {
    match kind {
        NodeKind::TripDeparture { trip, .. } | NodeKind::TripArrival { trip, .. } => Some(trip),
        _ => None,
    }
}

/// One scheduled event a ride leg passes through, both as timetabled and as
/// realized against the overlay that was active for the query.
#[derive(Debug, Clone, Copy)]
pub struct StopEvent {
    pub stop_id: StopId,
    pub scheduled_instant: Instant,
    pub realized_instant: Instant,
}

#[derive(Debug, Clone)]
pub enum LegDetail {
    Walk,
    Transfer,
    Ride {
        trip: TripId,
        route: RouteId,
        headsign: Option<Box<str>>,
        stop_events: Vec<StopEvent>,
    },
}

#[derive(Debug, Clone)]
pub struct Leg {
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub from_point: Option<GeoPoint>,
    pub to_point: Option<GeoPoint>,
    pub start_time: Instant,
    pub end_time: Instant,
    pub distance_m: f64,
    pub detail: LegDetail,
}

#[derive(Debug, Clone)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
    pub departure_time: Instant,
    pub arrival_time: Instant,
    pub n_transfers: u32,
}

struct Transition {
    kind_class: LegKind,
    edge_kind: EdgeKind,
    trip: Option<TripId>,
    distance_m: f64,
}

/// Walks `terminal`'s parent chain back to the search root and turns it into
/// a chronologically-ordered [`Itinerary`]. `reverse` must match the flag
/// the search that produced `terminal` ran with - a reverse search's chain
/// runs root-to-terminal in *decreasing* time, so it needs un-reversing, and
/// each transition's edge metadata is then found on the opposite end of the
/// pair from a forward search's (see the walk below).
pub fn reconstruct(
    graph: &BaseGraph,
    query: &QueryGraph,
    overlay: &FeedOverlay,
    arena: &LabelArena,
    terminal: LabelIdx,
    reverse: bool,
    n_transfers: u32,
) -> Itinerary {
    let chain = arena.reconstruct(terminal);
    let chrono: Vec<LabelIdx> = if reverse { chain.into_iter().rev().collect() } else { chain };

    let node_kind_of = |idx: LabelIdx| -> NodeKind {
        let node = arena.get(idx).node;
        if query.is_virtual_node(node) {
            // Virtual origin/destination nodes carry no transit semantics.
            NodeKind::Walk
        } else {
            graph.node(node).kind
        }
    };

    let mut transitions = Vec::with_capacity(chrono.len().saturating_sub(1));
    for i in 0..chrono.len().saturating_sub(1) {
        // A forward search records a transition's edge on its *later* label
        // (the child); a reverse search explores backward in time, so the
        // same metadata ends up on the *earlier* one. See the module doc.
        let bearer = if reverse { chrono[i] } else { chrono[i + 1] };
        let label = arena.get(bearer);
        let edge_kind = label.incoming_kind.unwrap_or(EdgeKind::Highway);
        // An overlay extra edge stamps its trip on the label directly, since
        // it has no TripDeparture/TripArrival node pair of its own to carry
        // one; ordinary scheduled edges fall back to the node-kind lookup.
        let trip = label.incoming_trip.or_else(|| node_trip(node_kind_of(chrono[i])).or_else(|| node_trip(node_kind_of(chrono[i + 1]))));
        transitions.push(Transition {
            kind_class: classify_leg_kind(edge_kind),
            edge_kind,
            trip,
            distance_m: label.incoming_distance_m,
        });
    }

    fold_boundaries(&mut transitions);

    let legs = build_legs(graph, query, overlay, arena, &chrono, &transitions);
    let departure_time = arena.get(*chrono.first().unwrap()).time;
    let arrival_time = arena.get(*chrono.last().unwrap()).time;

    Itinerary { legs, departure_time, arrival_time, n_transfers }
}

/// Zero-cost `Boundary` transitions (`ENTER_PT`/`EXIT_PT`/.../`WAIT`) never
/// form their own leg; each is relabeled to whichever real leg kind borders
/// it, preferring the one that follows so a platform's exit blends into the
/// walk that leaves it.
fn fold_boundaries(transitions: &mut [Transition]) {
    for i in (0..transitions.len()).rev() {
        if transitions[i].kind_class == LegKind::Boundary && i + 1 < transitions.len() {
            let (kind_class, trip) = (transitions[i + 1].kind_class, transitions[i + 1].trip);
            if kind_class != LegKind::Boundary {
                transitions[i].kind_class = kind_class;
                transitions[i].trip = trip;
            }
        }
    }
    for i in 0..transitions.len() {
        if transitions[i].kind_class == LegKind::Boundary {
            if i > 0 {
                transitions[i].kind_class = transitions[i - 1].kind_class;
                transitions[i].trip = transitions[i - 1].trip;
            } else {
                transitions[i].kind_class = LegKind::Walk;
            }
        }
    }
}

fn build_legs(
    graph: &BaseGraph,
    query: &QueryGraph,
    overlay: &FeedOverlay,
    arena: &LabelArena,
    chrono: &[LabelIdx],
    transitions: &[Transition],
) -> Vec<Leg> {
    let mut legs = Vec::new();
    let mut start = 0usize;
    while start < transitions.len() {
        let mut end = start;
        while end + 1 < transitions.len()
            && transitions[end + 1].kind_class == transitions[start].kind_class
            && transitions[end + 1].trip == transitions[start].trip
        {
            end += 1;
        }
        legs.push(make_leg(graph, query, overlay, arena, chrono, transitions, start, end));
        start = end + 1;
    }
    legs
}

fn make_leg(
    graph: &BaseGraph,
    query: &QueryGraph,
    overlay: &FeedOverlay,
    arena: &LabelArena,
    chrono: &[LabelIdx],
    transitions: &[Transition],
    start: usize,
    end: usize,
) -> Leg {
    let from_label = chrono[start];
    let to_label = chrono[end + 1];
    let from_node = arena.get(from_label).node;
    let to_node = arena.get(to_label).node;
    let distance_m: f64 = transitions[start..=end].iter().map(|t| t.distance_m).sum();

    let detail = match transitions[start].kind_class {
        LegKind::Walk => LegDetail::Walk,
        LegKind::Transfer => LegDetail::Transfer,
        LegKind::Ride => {
            let trip = transitions[start].trip.expect("ride leg must carry a trip");
            if overlay.is_extra_trip(trip, graph) {
                // A FeedOverlay extra edge: no TripDeparture/TripArrival pair to
                // walk, so the leg is exactly the one hop the edge represents,
                // already realized (the feed reports it, it carries no separate
                // schedule to slip against).
                let extra = overlay.extra_trip(trip, graph);
                let stop_events = vec![
                    StopEvent { stop_id: extra.from_stop, scheduled_instant: arena.get(from_label).time, realized_instant: arena.get(from_label).time },
                    StopEvent { stop_id: extra.to_stop, scheduled_instant: arena.get(to_label).time, realized_instant: arena.get(to_label).time },
                ];
                LegDetail::Ride { trip, route: extra.route, headsign: extra.headsign.clone(), stop_events }
            } else {
                let trip_record = &graph.trips[trip as usize];
                let mut stop_events = Vec::new();
                for &idx in &chrono[start..=end + 1] {
                    let label = arena.get(idx);
                    let node = label.node;
                    if query.is_virtual_node(node) {
                        continue;
                    }
                    let (seq, is_arrival) = match graph.node(node).kind {
                        NodeKind::TripDeparture { seq, .. } => (seq, false),
                        NodeKind::TripArrival { seq, .. } => (seq, true),
                        _ => continue,
                    };
                    let delay = overlay.delay_at(trip, seq);
                    let delay_s = if is_arrival { delay.arrival_delay_s } else { delay.departure_delay_s };
                    let Some(&stop_id) = trip_record.stops.get(seq as usize) else { continue };
                    stop_events.push(StopEvent {
                        stop_id,
                        realized_instant: label.time,
                        scheduled_instant: label.time - delay_s,
                    });
                }
                LegDetail::Ride {
                    trip,
                    route: trip_record.route,
                    headsign: trip_record.headsign.clone(),
                    stop_events,
                }
            }
        }
        LegKind::Boundary => unreachable!("fold_boundaries removes every Boundary-classified transition"),
    };

    Leg {
        from_node,
        to_node,
        from_point: query.point_of(from_node),
        to_point: query.point_of(to_node),
        start_time: arena.get(from_label).time,
        end_time: arena.get(to_label).time,
        distance_m,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BaseGraph, GeoPoint, NodeKind, StopRecord, TripRecord};
    use crate::label::Label;
    use chrono::NaiveDate;

    fn graph_with_one_ride() -> (BaseGraph, NodeId, NodeId) {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let stop_a = graph.add_node(NodeKind::StopPlatform(0), Some(GeoPoint { lat: 0.0, lon: 0.0 }));
        let stop_b = graph.add_node(NodeKind::StopPlatform(1), Some(GeoPoint { lat: 0.01, lon: 0.0 }));
        graph.stops.push(StopRecord {
            id: "A".into(),
            name: "A".into(),
            platform_node: stop_a,
            point: GeoPoint { lat: 0.0, lon: 0.0 },
            board_edges: Vec::new(),
            alight_edges: Vec::new(),
        });
        graph.stops.push(StopRecord {
            id: "B".into(),
            name: "B".into(),
            platform_node: stop_b,
            point: GeoPoint { lat: 0.01, lon: 0.0 },
            board_edges: Vec::new(),
            alight_edges: Vec::new(),
        });
        graph.routes.push(crate::graph::RouteRecord { id: "R1".into(), short_name: "R1".into() });
        graph.trips.push(TripRecord {
            id: "T1".into(),
            route: 0,
            headsign: Some("Downtown".into()),
            service_days: crate::graph::ServiceDays::EVERY_DAY,
            stops: vec![0, 1],
        });
        (graph, stop_a, stop_b)
    }

    #[test]
    fn coalesces_board_hop_alight_into_a_single_ride_leg() {
        let (mut graph, stop_a, stop_b) = graph_with_one_ride();
        let dep_node = graph.add_node(NodeKind::TripDeparture { trip: 0, seq: 0 }, None);
        let arr_node = graph.add_node(NodeKind::TripArrival { trip: 0, seq: 1 }, None);
        let query = QueryGraph::new(&graph);
        let overlay = FeedOverlay::default();

        let mut arena = LabelArena::new();
        let root = arena.push(Label::root(1_000, stop_a));
        let at_dep = arena.push(Label {
            incoming_kind: Some(EdgeKind::Board),
            incoming_distance_m: 0.0,
            node: dep_node,
            parent: Some(root),
            n_transfers: 1,
            ..Label::root(1_000, dep_node)
        });
        let at_arr = arena.push(Label {
            incoming_kind: Some(EdgeKind::Hop),
            incoming_distance_m: 1_000.0,
            node: arr_node,
            parent: Some(at_dep),
            n_transfers: 1,
            ..Label::root(1_300, arr_node)
        });
        let at_b = arena.push(Label {
            incoming_kind: Some(EdgeKind::Alight),
            incoming_distance_m: 0.0,
            node: stop_b,
            parent: Some(at_arr),
            n_transfers: 1,
            ..Label::root(1_300, stop_b)
        });

        let itinerary = reconstruct(&graph, &query, &overlay, &arena, at_b, false, 1);
        assert_eq!(itinerary.legs.len(), 1);
        match &itinerary.legs[0].detail {
            LegDetail::Ride { trip, stop_events, .. } => {
                assert_eq!(*trip, 0);
                assert_eq!(stop_events.len(), 2);
                assert_eq!(stop_events[0].stop_id, 0);
                assert_eq!(stop_events[1].stop_id, 1);
            }
            other => panic!("expected a ride leg, got {other:?}"),
        }
        assert_eq!(itinerary.departure_time, 1_000);
        assert_eq!(itinerary.arrival_time, 1_300);
    }

    #[test]
    fn an_extra_edge_reconstructs_as_a_ride_with_no_trip_record() {
        let (graph, stop_a, stop_b) = graph_with_one_ride();
        let query = QueryGraph::new(&graph);
        let mut overlay = FeedOverlay::default();
        let trip = overlay.add_extra_trip(
            &graph,
            crate::overlay::ExtraTripRecord { route: 0, headsign: None, from_stop: 0, to_stop: 1 },
        );

        let mut arena = LabelArena::new();
        let root = arena.push(Label::root(1_000, stop_a));
        let at_b = arena.push(Label {
            incoming_kind: Some(EdgeKind::Hop),
            incoming_distance_m: 1_000.0,
            incoming_trip: Some(trip),
            node: stop_b,
            parent: Some(root),
            n_transfers: 1,
            ..Label::root(1_300, stop_b)
        });

        let itinerary = reconstruct(&graph, &query, &overlay, &arena, at_b, false, 1);
        assert_eq!(itinerary.legs.len(), 1);
        match &itinerary.legs[0].detail {
            LegDetail::Ride { trip: got_trip, stop_events, .. } => {
                assert_eq!(*got_trip, trip);
                assert_eq!(stop_events.len(), 2);
                assert_eq!(stop_events[0].stop_id, 0);
                assert_eq!(stop_events[1].stop_id, 1);
            }
            other => panic!("expected a ride leg, got {other:?}"),
        }
    }
}
