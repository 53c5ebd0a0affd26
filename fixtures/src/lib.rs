//! In-memory fixtures for the integration tests (§8's seed scenarios).
//! Grounded on the teacher's `dev_utils` crate (`load_example_gtfs`,
//! `build_example_network`, `get_example_scenario`): a handful of functions
//! that hand back a ready-to-query graph, but built directly against
//! `BaseGraph`/`walk_network` rather than reading a GTFS zip, so the test
//! suite runs hermetically and fast.

use chrono::NaiveDate;

use transit_router::graph::walk_network;
use transit_router::graph::{BaseGraph, EdgeKind, GeoPoint, NodeKind, RouteRecord, ServiceDays, StopId, StopRecord, TripRecord};

pub fn service_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// Midnight UTC of [`service_date`] plus `hh:mm:ss`, as the absolute
/// [`transit_router::graph::Instant`] the search operates on.
pub fn instant(hh: i64, mm: i64, ss: i64) -> i64 {
    service_date().and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp() + seconds_of_day(hh, mm, ss)
}

/// `hh:mm:ss` as GTFS-style seconds-of-day, the unit `EdgeRecord::time`
/// stores `Board`/`Alight` events in.
pub fn seconds_of_day(hh: i64, mm: i64, ss: i64) -> i64 {
    hh * 3600 + mm * 60 + ss
}

/// Adds a stop: a platform node plus a co-located walk node joined by a
/// zero-cost `ENTER_PT`/`EXIT_PT` pair, the way `gtfs_import` does for every
/// GTFS stop.
pub fn add_stop(graph: &mut BaseGraph, id: &str, point: GeoPoint) -> (StopId, transit_router::graph::NodeId) {
    let platform_node = graph.add_node(NodeKind::StopPlatform(graph.stops.len() as StopId), Some(point));
    let walk_node = graph.add_node(NodeKind::Walk, Some(point));
    graph.add_edge(walk_node, platform_node, EdgeKind::EnterPt, 0, 0.0, None);
    graph.add_edge(platform_node, walk_node, EdgeKind::ExitPt, 0, 0.0, None);

    let stop_id = graph.stops.len() as StopId;
    graph.stop_index.insert(id.to_string(), stop_id);
    graph.stops.push(StopRecord { id: id.into(), name: id.into(), platform_node, point, board_edges: Vec::new(), alight_edges: Vec::new() });
    (stop_id, walk_node)
}

/// Adds a single-hop trip on `route` between two already-added stops,
/// departing/arriving at the given seconds-of-day, valid every day. Returns
/// the trip id.
pub fn add_trip(
    graph: &mut BaseGraph,
    route: transit_router::graph::RouteId,
    from_stop: StopId,
    to_stop: StopId,
    departure_s: i64,
    arrival_s: i64,
) -> transit_router::graph::TripId {
    let trip_id = graph.trips.len() as transit_router::graph::TripId;
    graph.trips.push(TripRecord {
        id: format!("trip-{trip_id}").into_boxed_str(),
        route,
        headsign: None,
        service_days: ServiceDays::EVERY_DAY,
        stops: vec![from_stop, to_stop],
    });

    let dep_node = graph.add_node(NodeKind::TripDeparture { trip: trip_id, seq: 0 }, None);
    let arr_node = graph.add_node(NodeKind::TripArrival { trip: trip_id, seq: 1 }, None);

    let from_platform = graph.stop(from_stop).platform_node;
    let to_platform = graph.stop(to_stop).platform_node;

    let board = graph.add_edge(from_platform, dep_node, EdgeKind::Board, departure_s, 0.0, Some(ServiceDays::EVERY_DAY));
    graph.add_edge(dep_node, arr_node, EdgeKind::Hop, arrival_s - departure_s, graph.stop(from_stop).point.distance_m(graph.stop(to_stop).point), Some(ServiceDays::EVERY_DAY));
    let alight = graph.add_edge(arr_node, to_platform, EdgeKind::Alight, arrival_s, 0.0, Some(ServiceDays::EVERY_DAY));

    graph.stops[from_stop as usize].board_edges.push(board);
    graph.stops[to_stop as usize].alight_edges.push(alight);
    sort_schedule_edges(graph);
    trip_id
}

fn sort_schedule_edges(graph: &mut BaseGraph) {
    let BaseGraph { ref mut stops, ref edges, .. } = graph;
    for stop in stops.iter_mut() {
        stop.board_edges.sort_unstable_by_key(|&e| edges[e as usize].time);
        stop.alight_edges.sort_unstable_by_key(|&e| edges[e as usize].time);
    }
}

/// §8 scenario 1/2/5: stops A, B, route `R1`, a single trip departing A at
/// 08:05 and arriving at B at 08:15.
pub fn two_stop_scenario() -> (BaseGraph, StopId, StopId, transit_router::graph::TripId) {
    let mut graph = BaseGraph::new(service_date());
    let (a, _) = add_stop(&mut graph, "A", GeoPoint { lat: -37.8136, lon: 144.9631 });
    let (b, _) = add_stop(&mut graph, "B", GeoPoint { lat: -37.8200, lon: 144.9631 });
    graph.routes.push(RouteRecord { id: "R1".into(), short_name: "R1".into() });
    let trip = add_trip(&mut graph, 0, a, b, seconds_of_day(8, 5, 0), seconds_of_day(8, 15, 0));
    (graph, a, b, trip)
}

/// A point roughly 200 m north of stop A, for the coordinate-to-station
/// scenario (§8 #2). ~0.0018 degrees of latitude at Melbourne's latitude.
pub fn near_stop_a() -> GeoPoint {
    GeoPoint { lat: -37.8136 - 0.0018, lon: 144.9631 }
}

/// §8 scenario 3/4: stops A, B, C; `R1` runs A→B 08:05→08:15, `R2` runs
/// B→C 08:20→08:30 - the only path from A to C requires one transfer at B.
pub fn three_stop_scenario() -> (BaseGraph, StopId, StopId, StopId) {
    let mut graph = BaseGraph::new(service_date());
    let (a, _) = add_stop(&mut graph, "A", GeoPoint { lat: -37.8136, lon: 144.9631 });
    let (b, _) = add_stop(&mut graph, "B", GeoPoint { lat: -37.8200, lon: 144.9631 });
    let (c, _) = add_stop(&mut graph, "C", GeoPoint { lat: -37.8260, lon: 144.9631 });
    graph.routes.push(RouteRecord { id: "R1".into(), short_name: "R1".into() });
    graph.routes.push(RouteRecord { id: "R2".into(), short_name: "R2".into() });
    add_trip(&mut graph, 0, a, b, seconds_of_day(8, 5, 0), seconds_of_day(8, 15, 0));
    add_trip(&mut graph, 1, b, c, seconds_of_day(8, 20, 0), seconds_of_day(8, 30, 0));
    (graph, a, b, c)
}

/// §8 scenario 6: a walk-only chain long enough that `max_visited_nodes=100`
/// exhausts before reaching the far end.
pub fn long_walk_chain(n: usize) -> (BaseGraph, transit_router::graph::NodeId, transit_router::graph::NodeId) {
    let mut graph = BaseGraph::new(service_date());
    let first = walk_network::add_walk_node(&mut graph, GeoPoint { lat: 0.0, lon: 0.0 });
    let mut last = first;
    for i in 1..n {
        last = walk_network::add_connected_walk_node(&mut graph, last, GeoPoint { lat: 0.0005 * i as f64, lon: 0.0 });
    }
    (graph, first, last)
}
