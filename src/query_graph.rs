//! `QueryGraph` (§4.5): the transient per-query augmentation that binds free
//! query points to the read-only base graph via virtual nodes and edges,
//! without ever mutating it ("a structural overlay, not a mutation", §9).
//! Grounded on the teacher's own separation of static `Network` from the
//! per-query `Journey`/round-state in `raptor.rs`, generalized from "one
//! array of per-round state" to "one arena of virtual nodes/edges".
//!
//! Simplification from the full §4.5 description: rather than splitting a
//! base edge at the closest projection of a query coordinate, a query point
//! is bound by one virtual `HIGHWAY` edge running straight from the virtual
//! node to the nearest walk node found by `spatial_index` (see DESIGN.md),
//! so the main search can still reach anywhere the ordinary walk network
//! does. `plan.rs` additionally runs `StationAccess` from that same walk
//! node and appends one more virtual edge straight to each reachable
//! station's boundary walk node, short-circuiting the (potentially large)
//! intermediate walk-network expansion the main multi-criteria search would
//! otherwise have to redo just to get to a platform.

use std::collections::HashMap;

use crate::graph::{BaseGraph, EdgeKind, GeoPoint, NodeId};

#[derive(Debug, Clone, Copy)]
pub struct VirtualEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    pub time: i64,
    pub distance_m: f64,
}

pub struct QueryGraph<'g> {
    base: &'g BaseGraph,
    next_virtual_id: NodeId,
    virtual_points: HashMap<NodeId, GeoPoint>,
    edges: Vec<VirtualEdge>,
    out_index: HashMap<NodeId, Vec<usize>>,
    in_index: HashMap<NodeId, Vec<usize>>,
}

impl<'g> QueryGraph<'g> {
    pub fn new(base: &'g BaseGraph) -> Self {
        Self {
            base,
            next_virtual_id: base.node_count(),
            virtual_points: HashMap::new(),
            edges: Vec::new(),
            out_index: HashMap::new(),
            in_index: HashMap::new(),
        }
    }

    /// Node ids of virtual nodes are allocated above `base_graph.node_count` (§4.5).
    pub fn allocate_virtual_node(&mut self, point: Option<GeoPoint>) -> NodeId {
        let id = self.next_virtual_id;
        self.next_virtual_id += 1;
        if let Some(p) = point {
            self.virtual_points.insert(id, p);
        }
        id
    }

    pub fn add_virtual_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, time: i64, distance_m: f64) {
        let idx = self.edges.len();
        self.edges.push(VirtualEdge { from, to, kind, time, distance_m });
        self.out_index.entry(from).or_default().push(idx);
        self.in_index.entry(to).or_default().push(idx);
    }

    pub fn is_virtual_node(&self, node: NodeId) -> bool {
        node >= self.base.node_count()
    }

    pub fn point_of(&self, node: NodeId) -> Option<GeoPoint> {
        if self.is_virtual_node(node) {
            self.virtual_points.get(&node).copied()
        } else {
            self.base.node(node).point
        }
    }

    pub fn out_virtual_edges(&self, node: NodeId) -> impl Iterator<Item = &VirtualEdge> {
        self.out_index.get(&node).into_iter().flatten().map(move |&i| &self.edges[i])
    }

    pub fn in_virtual_edges(&self, node: NodeId) -> impl Iterator<Item = &VirtualEdge> {
        self.in_index.get(&node).into_iter().flatten().map(move |&i| &self.edges[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn virtual_nodes_are_allocated_above_the_base_graph() {
        let base = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let mut query = QueryGraph::new(&base);
        let first = query.allocate_virtual_node(None);
        let second = query.allocate_virtual_node(None);
        assert!(first >= base.node_count());
        assert_eq!(second, first + 1);
    }

    #[test]
    fn virtual_edges_are_retrievable_from_both_ends() {
        let base = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let mut query = QueryGraph::new(&base);
        let origin = query.allocate_virtual_node(None);
        query.add_virtual_edge(origin, 0, EdgeKind::Highway, 42, 100.0);

        assert_eq!(query.out_virtual_edges(origin).count(), 1);
        assert_eq!(query.in_virtual_edges(0).count(), 1);
    }
}
