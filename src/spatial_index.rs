//! Brute-force nearest-node lookup (§2 ambient component `spatial_index`).
//! A few hundred walk nodes in any of this crate's fixtures makes a linear
//! scan the correct implementation; a production deployment swaps this
//! module for an R-tree or grid index without touching anything downstream
//! (`StationAccess`, `QueryGraph`, ...) - the same swappable-collaborator
//! seam `walk_network` documents for OSM import.

use crate::graph::{BaseGraph, GeoPoint, NodeId};

pub struct SpatialIndex<'g> {
    graph: &'g BaseGraph,
}

impl<'g> SpatialIndex<'g> {
    pub fn new(graph: &'g BaseGraph) -> Self {
        Self { graph }
    }

    /// The closest walk node to `point` within `max_distance_m`, if any.
    pub fn nearest_walk_node(&self, point: GeoPoint, max_distance_m: f64) -> Option<(NodeId, f64)> {
        self.graph
            .walk_nodes
            .iter()
            .filter_map(|&id| {
                let node_point = self.graph.node(id).point?;
                Some((id, point.distance_m(node_point)))
            })
            .filter(|&(_, distance)| distance <= max_distance_m)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;
    use chrono::NaiveDate;

    #[test]
    fn picks_the_closer_of_two_nodes() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let near = graph.add_node(NodeKind::Walk, Some(GeoPoint { lat: 0.0, lon: 0.0 }));
        let _far = graph.add_node(NodeKind::Walk, Some(GeoPoint { lat: 1.0, lon: 1.0 }));

        let index = SpatialIndex::new(&graph);
        let (found, distance) = index.nearest_walk_node(GeoPoint { lat: 0.001, lon: 0.0 }, 10_000.0).unwrap();
        assert_eq!(found, near);
        assert!(distance < 200.0);
    }

    #[test]
    fn respects_the_max_distance_cutoff() {
        let mut graph = BaseGraph::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        graph.add_node(NodeKind::Walk, Some(GeoPoint { lat: 0.0, lon: 0.0 }));

        let index = SpatialIndex::new(&graph);
        assert!(index.nearest_walk_node(GeoPoint { lat: 10.0, lon: 10.0 }, 100.0).is_none());
    }
}
