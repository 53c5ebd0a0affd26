//! `LabelSetting` (§4.3): the multi-criteria main loop that drives a
//! `GraphExplorer` to a Pareto-optimal set of labels at the destination.
//! Grounded on the teacher's RAPTOR main loop in `raptor.rs` (a priority
//! structure of open labels, pop the best, relax its out-edges, stop once
//! the structure is exhausted or a budget is hit), generalized from RAPTOR's
//! round-by-round scan to a single `BinaryHeap` ordered by the criteria
//! vector the way Dijkstra's label-correcting variant is, per §4.3.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::explorer::GraphExplorer;
use crate::graph::{Instant, NodeId};
use crate::label::{Label, LabelArena, LabelIdx, ParetoFront};

/// Per-query knobs §4.3/§6 hints map onto.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub ignore_transfers: bool,
    pub profile_query: bool,
    pub max_visited_nodes: u64,
    pub max_walk_distance_per_leg: f64,
    pub max_transfer_distance_per_leg: f64,
    /// `None` means "collect every Pareto-optimal label reaching the
    /// destination"; `Some(n)` stops once `n` have been emitted.
    pub limit_solutions: Option<usize>,
}

pub struct SearchOutcome {
    pub arena: LabelArena,
    /// Pareto-optimal labels at the destination, in the order they were
    /// popped (ascending in the primary criterion).
    pub solutions: Vec<LabelIdx>,
    pub visited_nodes: u64,
    /// Set when `max_visited_nodes` was exhausted before the queue drained -
    /// a non-fatal condition (§7): `solutions` may be a subset of the true
    /// Pareto front.
    pub exhausted: bool,
}

struct QueueEntry {
    key_time: i64,
    n_transfers: u32,
    seq: u64,
    label: LabelIdx,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.key_time, self.n_transfers, self.seq) == (other.key_time, other.n_transfers, other.seq)
    }
}
impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest key first -
        // earliest time (or, reversed search, latest), fewest transfers,
        // then insertion order as the deterministic tie-break §4.3 asks for.
        (other.key_time, other.n_transfers, other.seq).cmp(&(self.key_time, self.n_transfers, self.seq))
    }
}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs the label-setting search from `start` at `start_time` toward
/// `dest`, via `explorer` (which already knows the search direction).
pub fn run(explorer: &GraphExplorer, start: NodeId, start_time: Instant, dest: NodeId, params: &SearchParams) -> SearchOutcome {
    let mut arena = LabelArena::new();
    let mut fronts: HashMap<NodeId, ParetoFront> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    let mut visited_nodes = 0u64;
    let mut solutions = Vec::new();
    let mut exhausted = false;

    let root_idx = arena.push(Label::root(start_time, start));
    fronts.entry(start).or_default().try_insert(&arena, root_idx, explorer.reverse(), params.ignore_transfers, params.profile_query);
    heap.push(QueueEntry { key_time: key_time(start_time, explorer.reverse()), n_transfers: 0, seq, label: root_idx });
    seq += 1;

    while let Some(entry) = heap.pop() {
        let label = *arena.get(entry.label);

        // Stale: `label` may have since been evicted from its node's front by
        // a label discovered through a shorter path after this entry was
        // queued. `ParetoFront` never removes from `arena`, only from
        // `members`, so checking membership is how we skip it cheaply.
        if !fronts.get(&label.node).is_some_and(|f| f.members().contains(&entry.label)) {
            continue;
        }

        if visited_nodes >= params.max_visited_nodes {
            exhausted = true;
            break;
        }
        visited_nodes += 1;

        if label.node == dest {
            solutions.push(entry.label);
            if let Some(limit) = params.limit_solutions {
                if solutions.len() >= limit {
                    break;
                }
            }
            // A destination label may still not be dominated at other
            // criteria by labels that pass through it on the way elsewhere
            // in a multi-point itinerary; §4.3 doesn't ask us to stop
            // expanding it, so fall through to relax its out-edges too.
        }

        for edge in explorer.expand(label.node, label.time, label.n_transfers) {
            let mut walk = label.walk_distance_on_current_leg;
            let mut transfer_walk = label.transfer_walk_distance_on_current_leg;
            if edge.class.resets_leg {
                walk = 0.0;
                transfer_walk = 0.0;
            }
            if edge.class.counts_walk_distance {
                walk += edge.distance_m;
            }
            if edge.class.counts_transfer_walk_distance {
                transfer_walk += edge.distance_m;
            }
            if walk > params.max_walk_distance_per_leg || transfer_walk > params.max_transfer_distance_per_leg {
                continue;
            }

            let new_time = label.time + edge.time_delta;
            let n_transfers = label.n_transfers + u32::from(edge.class.is_transfer_boundary);
            let first_pt_departure_time = next_first_departure(&label, &edge, new_time, explorer.reverse());

            let candidate = Label {
                time: new_time,
                node: edge.to,
                incoming_kind: Some(edge.kind),
                incoming_distance_m: edge.distance_m,
                incoming_trip: edge.trip,
                n_transfers,
                walk_distance_on_current_leg: walk,
                transfer_walk_distance_on_current_leg: transfer_walk,
                first_pt_departure_time,
                parent: Some(entry.label),
            };

            let candidate_idx = arena.push(candidate);
            let front = fronts.entry(edge.to).or_default();
            if front.try_insert(&arena, candidate_idx, explorer.reverse(), params.ignore_transfers, params.profile_query) {
                heap.push(QueueEntry { key_time: key_time(new_time, explorer.reverse()), n_transfers, seq, label: candidate_idx });
                seq += 1;
            }
        }
    }

    SearchOutcome { arena, solutions, visited_nodes, exhausted }
}

fn key_time(time: Instant, reverse: bool) -> i64 {
    if reverse {
        -time
    } else {
        time
    }
}

/// Tracks the instant of the itinerary's first scheduled boarding (§3), used
/// by profile queries to report which departure a given Pareto-optimal label
/// corresponds to. Forward search meets boardings in chronological order, so
/// the first one seen is kept; reverse search meets them in reverse
/// chronological order, so each new boarding overwrites the previous one and
/// the value left after the walk back to the origin is the earliest.
fn next_first_departure(label: &Label, edge: &crate::explorer::ExplorerEdge, new_time: Instant, reverse: bool) -> Option<Instant> {
    use crate::graph::EdgeKind;
    if edge.kind != EdgeKind::Board {
        return label.first_pt_departure_time;
    }
    if reverse {
        Some(new_time)
    } else {
        label.first_pt_departure_time.or(Some(new_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::walk_network;
    use crate::graph::{BaseGraph, EdgeKind, GeoPoint, NodeKind};
    use crate::overlay::FeedOverlay;
    use crate::query_graph::QueryGraph;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn default_params() -> SearchParams {
        SearchParams {
            ignore_transfers: false,
            profile_query: false,
            max_visited_nodes: 1_000_000,
            max_walk_distance_per_leg: 2_000.0,
            max_transfer_distance_per_leg: 500.0,
            limit_solutions: None,
        }
    }

    #[test]
    fn finds_the_direct_walk_between_two_nodes() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let a = walk_network::add_walk_node(&mut graph, GeoPoint { lat: 0.0, lon: 0.0 });
        let b = walk_network::add_connected_walk_node(&mut graph, a, GeoPoint { lat: 0.001, lon: 0.0 });

        let query = QueryGraph::new(&graph);
        let overlay = Arc::new(FeedOverlay::default());
        let explorer = GraphExplorer::new(&graph, &query, overlay, false, 1.4, 120);

        let outcome = run(&explorer, a, 1_000, b, &default_params());
        assert_eq!(outcome.solutions.len(), 1);
        let chain = outcome.arena.reconstruct(outcome.solutions[0]);
        assert_eq!(outcome.arena.get(*chain.first().unwrap()).node, a);
        assert_eq!(outcome.arena.get(*chain.last().unwrap()).node, b);
    }

    #[test]
    fn boards_and_alights_a_single_trip_between_two_stops() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let stop_a = graph.add_node(NodeKind::StopPlatform(0), Some(GeoPoint { lat: 0.0, lon: 0.0 }));
        let stop_b = graph.add_node(NodeKind::StopPlatform(1), Some(GeoPoint { lat: 0.01, lon: 0.0 }));
        graph.stops.push(crate::graph::StopRecord {
            id: "A".into(),
            name: "A".into(),
            platform_node: stop_a,
            point: GeoPoint { lat: 0.0, lon: 0.0 },
            board_edges: Vec::new(),
            alight_edges: Vec::new(),
        });
        graph.stops.push(crate::graph::StopRecord {
            id: "B".into(),
            name: "B".into(),
            platform_node: stop_b,
            point: GeoPoint { lat: 0.01, lon: 0.0 },
            board_edges: Vec::new(),
            alight_edges: Vec::new(),
        });

        let dep = graph.add_node(NodeKind::TripDeparture { trip: 0, seq: 0 }, None);
        let arr = graph.add_node(NodeKind::TripArrival { trip: 0, seq: 1 }, None);
        let board = graph.add_edge(stop_a, dep, EdgeKind::Board, 1_000, 0.0, None);
        graph.add_edge(dep, arr, EdgeKind::Hop, 300, 1_000.0, None);
        let alight = graph.add_edge(arr, stop_b, EdgeKind::Alight, 1_300, 0.0, None);
        graph.stops[0].board_edges.push(board);
        graph.stops[1].alight_edges.push(alight);

        let query = QueryGraph::new(&graph);
        let overlay = Arc::new(FeedOverlay::default());
        let explorer = GraphExplorer::new(&graph, &query, overlay, false, 1.4, 120);

        let outcome = run(&explorer, stop_a, 500, stop_b, &default_params());
        assert_eq!(outcome.solutions.len(), 1);
        let label = outcome.arena.get(outcome.solutions[0]);
        assert_eq!(label.time, 1_300);
        assert_eq!(label.n_transfers, 1);
        assert_eq!(label.first_pt_departure_time, Some(1_000));
    }

    #[test]
    fn respects_the_walk_distance_budget() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let a = walk_network::add_walk_node(&mut graph, GeoPoint { lat: 0.0, lon: 0.0 });
        let b = walk_network::add_connected_walk_node(&mut graph, a, GeoPoint { lat: 1.0, lon: 0.0 });

        let query = QueryGraph::new(&graph);
        let overlay = Arc::new(FeedOverlay::default());
        let explorer = GraphExplorer::new(&graph, &query, overlay, false, 1.4, 120);

        let mut params = default_params();
        params.max_walk_distance_per_leg = 100.0;
        let outcome = run(&explorer, a, 0, b, &params);
        assert!(outcome.solutions.is_empty());
    }

    #[test]
    fn an_overlay_extra_edge_is_offered_as_an_ordinary_ride() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let stop_a = graph.add_node(NodeKind::StopPlatform(0), Some(GeoPoint { lat: 0.0, lon: 0.0 }));
        let stop_b = graph.add_node(NodeKind::StopPlatform(1), Some(GeoPoint { lat: 0.01, lon: 0.0 }));
        graph.stops.push(crate::graph::StopRecord {
            id: "A".into(),
            name: "A".into(),
            platform_node: stop_a,
            point: GeoPoint { lat: 0.0, lon: 0.0 },
            board_edges: Vec::new(),
            alight_edges: Vec::new(),
        });
        graph.stops.push(crate::graph::StopRecord {
            id: "B".into(),
            name: "B".into(),
            platform_node: stop_b,
            point: GeoPoint { lat: 0.01, lon: 0.0 },
            board_edges: Vec::new(),
            alight_edges: Vec::new(),
        });
        graph.routes.push(crate::graph::RouteRecord { id: "R1".into(), short_name: "R1".into() });

        let mut overlay = FeedOverlay::default();
        let trip = overlay.add_extra_trip(
            &graph,
            crate::overlay::ExtraTripRecord { route: 0, headsign: None, from_stop: 0, to_stop: 1 },
        );
        overlay.add_extra_edge(stop_a, stop_b, EdgeKind::Hop, 300, 1_000.0, trip);

        let query = QueryGraph::new(&graph);
        let explorer = GraphExplorer::new(&graph, &query, Arc::new(overlay), false, 1.4, 120);

        let outcome = run(&explorer, stop_a, 1_000, stop_b, &default_params());
        assert_eq!(outcome.solutions.len(), 1);
        let label = outcome.arena.get(outcome.solutions[0]);
        assert_eq!(label.time, 1_300);
        assert_eq!(label.incoming_trip, Some(trip));
    }

    #[test]
    fn a_tight_visit_budget_is_reported_as_exhausted_not_fatal() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let a = walk_network::add_walk_node(&mut graph, GeoPoint { lat: 0.0, lon: 0.0 });
        let mut last = a;
        for i in 1..10 {
            last = walk_network::add_connected_walk_node(&mut graph, last, GeoPoint { lat: 0.0001 * i as f64, lon: 0.0 });
        }

        let query = QueryGraph::new(&graph);
        let overlay = Arc::new(FeedOverlay::default());
        let explorer = GraphExplorer::new(&graph, &query, overlay, false, 1.4, 120);

        let mut params = default_params();
        params.max_visited_nodes = 1;
        let outcome = run(&explorer, a, 0, last, &params);
        assert!(outcome.exhausted);
        assert!(outcome.solutions.is_empty());
    }
}
