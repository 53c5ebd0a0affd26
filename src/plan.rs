//! `plan()` (§6): the public entry point. Wires every component together -
//! snap, bind, station-access, search, reconstruct - the way the teacher's
//! `main.rs` wires `Network`/`raptor::run`/`Journey::from_raptor` end to end,
//! generalized from a single stdin query to the full request/response shape.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{RoutingError, RoutingResult};
use crate::explorer::GraphExplorer;
use crate::graph::{BaseGraph, EdgeKind, NodeId};
use crate::itinerary::{self, Itinerary};
use crate::overlay::FeedOverlay;
use crate::query_graph::QueryGraph;
use crate::request::{Hints, PlanRequest, PlanResponse, Point, VisitedNodesStats};
use crate::search::{self, SearchParams};
use crate::spatial_index::SpatialIndex;

/// Runs one trip-planning request to completion (§6).
///
/// Input-validation failures (§7) return `Err` directly, before any search
/// runs. A request with no feasible itinerary is not an error: it comes back
/// as `Ok(PlanResponse::no_path(..))`.
pub fn plan(graph: &BaseGraph, overlay: Arc<FeedOverlay>, config: &Config, request: &PlanRequest) -> RoutingResult<PlanResponse> {
    let spatial_index = SpatialIndex::new(graph);
    let mut query = QueryGraph::new(graph);

    let hints = &request.hints;
    let walk_speed_mps = hints.walk_speed_mps();
    let origin_anchor = bind_endpoint(graph, &spatial_index, &mut query, request.origin, 0, config, walk_speed_mps, false)?;
    let destination_anchor = bind_endpoint(graph, &spatial_index, &mut query, request.destination, 1, config, walk_speed_mps, true)?;

    let (start_node, dest_node, reverse) = if hints.arrive_by {
        (destination_anchor, origin_anchor, true)
    } else {
        (origin_anchor, destination_anchor, false)
    };

    let explorer = GraphExplorer::new(graph, &query, overlay.clone(), reverse, walk_speed_mps, config.default_transfer_time_s);

    let limit_solutions = hints.limit_solutions.or(Hints::default_limit_solutions(hints.profile_query, hints.ignore_transfers));
    let params = SearchParams {
        ignore_transfers: hints.ignore_transfers,
        profile_query: hints.profile_query,
        max_visited_nodes: config.max_visited_nodes,
        max_walk_distance_per_leg: hints.max_walk_distance_per_leg,
        max_transfer_distance_per_leg: hints.max_transfer_distance_per_leg,
        limit_solutions,
    };

    let outcome = search::run(&explorer, start_node, hints.earliest_departure_time, dest_node, &params);

    let mut visited_nodes = VisitedNodesStats::default();
    visited_nodes.record(outcome.visited_nodes);

    if outcome.solutions.is_empty() {
        return Ok(PlanResponse::no_path(visited_nodes, outcome.exhausted));
    }

    let mut itineraries: Vec<Itinerary> = outcome
        .solutions
        .iter()
        .map(|&label_idx| {
            // `n_transfers` on the label counts boardings (spec.md:41); the
            // reported transfer count is one fewer - a direct ride boards once
            // and transfers zero times.
            let n_transfers = outcome.arena.get(label_idx).n_transfers.saturating_sub(1);
            itinerary::reconstruct(graph, &query, &overlay, &outcome.arena, label_idx, reverse, n_transfers)
        })
        .collect();
    itineraries.sort_by_key(|it| it.arrival_time - it.departure_time);

    Ok(PlanResponse { itineraries, exhausted: outcome.exhausted, visited_nodes })
}

/// Resolves a request `Point` to the graph node the search should start/end
/// at. A station is already on the network - no binding needed. A
/// coordinate is snapped to its nearest walk node, given a virtual node of
/// its own, and connected to that walk node plus every station entrance
/// `StationAccess` finds nearby (§4.4/§4.5).
///
/// `is_destination` picks the edge direction: an origin walks *out* of its
/// virtual node into the network: a destination is walked *into*.
fn bind_endpoint(
    graph: &BaseGraph,
    spatial_index: &SpatialIndex,
    query: &mut QueryGraph,
    point: Point,
    index: usize,
    config: &Config,
    walk_speed_mps: f64,
    is_destination: bool,
) -> RoutingResult<NodeId> {
    match point {
        Point::Station(stop_id) => {
            let stop = graph.stops.get(stop_id as usize).ok_or(RoutingError::InvalidArgument(format!("unknown stop id {stop_id}")))?;
            Ok(stop.platform_node)
        }
        Point::Coordinate(coord) => {
            let (nearest_walk_node, snap_distance_m) =
                spatial_index.nearest_walk_node(coord, config.max_snap_distance_m).ok_or(RoutingError::PointNotFound { index })?;

            let virtual_node = query.allocate_virtual_node(Some(coord));
            let anchor_time = simple_walk_time(snap_distance_m, walk_speed_mps);

            if is_destination {
                query.add_virtual_edge(nearest_walk_node, virtual_node, EdgeKind::Highway, anchor_time, snap_distance_m);
            } else {
                query.add_virtual_edge(virtual_node, nearest_walk_node, EdgeKind::Highway, anchor_time, snap_distance_m);
            }

            // `StationAccess` runs in reverse for a destination: it finds the
            // boundary walk nodes that can *reach* `nearest_walk_node`, not
            // the ones reachable *from* it (§4.4's boundary-kind flip mirrors
            // this: `EXIT_PT` is the relevant edge leaving a station toward a
            // destination, `ENTER_PT` the one a traveler walks into).
            let access = crate::station_access::run(
                graph,
                nearest_walk_node,
                is_destination,
                walk_speed_mps,
                config.max_snap_distance_m,
                snap_distance_m,
            );
            for label in access {
                if is_destination {
                    query.add_virtual_edge(label.boundary_walk_node, virtual_node, EdgeKind::Highway, label.time_s, label.distance_m);
                } else {
                    query.add_virtual_edge(virtual_node, label.boundary_walk_node, EdgeKind::Highway, label.time_s, label.distance_m);
                }
            }

            Ok(virtual_node)
        }
    }
}

fn simple_walk_time(distance_m: f64, walk_speed_mps: f64) -> i64 {
    if walk_speed_mps <= 0.0 {
        i64::MAX / 2
    } else {
        (distance_m / walk_speed_mps).ceil() as i64
    }
}
