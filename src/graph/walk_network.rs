//! Minimal in-process walk-network builder (§2 ambient component
//! `walk_network`). Stands in for the OSM-extract importer named as
//! out-of-scope plumbing in §1: it takes an explicit list of walk nodes and
//! `HIGHWAY` edges between them and materializes them into a [`BaseGraph`].
//! A production deployment swaps this module for an OSM way importer while
//! keeping everything downstream (`EdgeCostModel`, `GraphExplorer`, ...)
//! unchanged - that seam is the point of keeping graph construction out of
//! the hard-engineering core.

use super::{BaseGraph, EdgeKind, GeoPoint, NodeId, NodeKind};

/// Adds a walk node at `point` and returns its id.
pub fn add_walk_node(graph: &mut BaseGraph, point: GeoPoint) -> NodeId {
    graph.add_node(NodeKind::Walk, Some(point))
}

/// Adds a bidirectional `HIGHWAY` edge between two walk nodes. `distance_m`
/// is taken as given rather than recomputed from the endpoints' coordinates,
/// so callers can model a non-straight-line path (e.g. a footbridge) between
/// two points that are geometrically close but not directly walkable.
pub fn connect(graph: &mut BaseGraph, a: NodeId, b: NodeId, distance_m: f64) {
    graph.add_edge_pair(a, b, EdgeKind::Highway, 0, distance_m);
}

/// Adds a walk node and connects it to an existing one in a single call,
/// using the great-circle distance between their coordinates.
pub fn add_connected_walk_node(graph: &mut BaseGraph, near: NodeId, point: GeoPoint) -> NodeId {
    let near_point = graph
        .node(near)
        .point
        .expect("walk nodes must carry coordinates");
    let node = add_walk_node(graph, point);
    connect(graph, near, node, near_point.distance_m(point));
    node
}
