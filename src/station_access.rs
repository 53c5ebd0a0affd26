//! `StationAccess` (§4.4): the short-range pass from a snapped walk node to
//! the stations it can reach on foot, materializing one virtual edge per
//! reachable station entrance for `LabelSetting` to consume. Single-criterion
//! (distance only, `n_transfers` disabled per §4.4) Dijkstra over `HIGHWAY`
//! edges - grounded on the same priority-queue shape `search.rs` uses for the
//! main multi-criteria search, simplified to one dimension since no transfers
//! or schedule lookups occur before the walk network is left behind.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::{BaseGraph, EdgeKind, NodeId};

/// A station entrance reached from the query's snapped walk node.
#[derive(Debug, Clone, Copy)]
pub struct AccessLabel {
    /// The walk node immediately before the `ENTER_PT`/`EXIT_PT` boundary -
    /// the main search crosses that edge itself, so its own accounting (leg
    /// reset, zero cost) still applies downstream.
    pub boundary_walk_node: NodeId,
    pub distance_m: f64,
    pub time_s: i64,
}

#[derive(PartialEq)]
struct HeapEntry(f64, NodeId);

impl Eq for HeapEntry {}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.total_cmp(&self.0) // min-heap on distance
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Runs the access pass from `start`, returning one `AccessLabel` per walk
/// node within `max_distance_m` that borders a station entrance: an
/// outgoing `ENTER_PT` edge in forward mode, an incoming `EXIT_PT` edge in
/// reverse (the boundary `GraphExplorer` itself will cross next).
///
/// `start_distance_m` seeds the accumulated distance at `start` - the caller
/// snaps a free coordinate to its nearest walk node before this pass begins,
/// and that snap distance needs to count toward `max_distance_m` and each
/// returned `AccessLabel.distance_m`/`time_s` just as if it were one more hop.
pub fn run(
    graph: &BaseGraph,
    start: NodeId,
    reverse: bool,
    walk_speed_mps: f64,
    max_distance_m: f64,
    start_distance_m: f64,
) -> Vec<AccessLabel> {
    let mut best: HashMap<NodeId, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(start, start_distance_m);
    heap.push(HeapEntry(start_distance_m, start));

    let mut reached = Vec::new();

    while let Some(HeapEntry(distance, node)) = heap.pop() {
        if best.get(&node).copied().unwrap_or(f64::INFINITY) < distance {
            continue;
        }
        if is_station_boundary(graph, node, reverse) {
            let time_s = if walk_speed_mps > 0.0 { (distance / walk_speed_mps).ceil() as i64 } else { i64::MAX / 2 };
            reached.push(AccessLabel { boundary_walk_node: node, distance_m: distance, time_s });
        }

        let edges = if reverse { &graph.node(node).in_edges } else { &graph.node(node).out_edges };
        for &edge_id in edges {
            let edge = graph.edge(edge_id);
            if edge.kind != EdgeKind::Highway {
                continue;
            }
            let neighbor = if reverse { edge.from } else { edge.to };
            let next_distance = distance + edge.distance_m;
            if next_distance > max_distance_m {
                continue;
            }
            if next_distance < best.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                best.insert(neighbor, next_distance);
                heap.push(HeapEntry(next_distance, neighbor));
            }
        }
    }

    reached
}

fn is_station_boundary(graph: &BaseGraph, node: NodeId, reverse: bool) -> bool {
    let wanted = if reverse { EdgeKind::ExitPt } else { EdgeKind::EnterPt };
    let edges = if reverse { &graph.node(node).in_edges } else { &graph.node(node).out_edges };
    edges.iter().any(|&e| graph.edge(e).kind == wanted)
}
