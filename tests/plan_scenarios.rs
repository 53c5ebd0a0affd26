//! §8 seed scenarios, run end to end through `plan()` against the `fixtures`
//! crate's in-memory graphs.

use std::collections::HashMap;
use std::sync::Arc;

use transit_router::itinerary::LegDetail;
use transit_router::overlay::FeedOverlay;
use transit_router::request::{Hints, PlanRequest, Point};
use transit_router::{plan, Config};

fn hints_at(departure: i64, config: &Config) -> Hints {
    Hints::new(departure, config)
}

#[test]
fn station_to_station_direct() {
    let (graph, a, b, _trip) = fixtures::two_stop_scenario();
    let config = Config::default();
    let request =
        PlanRequest::new(&[Point::Station(a), Point::Station(b)], hints_at(fixtures::instant(8, 0, 0), &config)).unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();

    assert_eq!(response.itineraries.len(), 1);
    let itinerary = &response.itineraries[0];
    assert_eq!(itinerary.n_transfers, 0);
    assert_eq!(itinerary.arrival_time, fixtures::instant(8, 15, 0));
    let ride_legs = itinerary.legs.iter().filter(|l| matches!(l.detail, LegDetail::Ride { .. })).count();
    assert_eq!(ride_legs, 1);
}

#[test]
fn coordinate_to_station_requires_walking() {
    let (graph, _a, b, _trip) = fixtures::two_stop_scenario();
    let config = Config::default();
    let request = PlanRequest::new(
        &[Point::Coordinate(fixtures::near_stop_a()), Point::Station(b)],
        hints_at(fixtures::instant(8, 0, 0), &config),
    )
    .unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();

    assert_eq!(response.itineraries.len(), 1);
    let itinerary = &response.itineraries[0];
    assert_eq!(itinerary.arrival_time, fixtures::instant(8, 15, 0));

    let walk_leg = itinerary.legs.iter().find(|l| matches!(l.detail, LegDetail::Walk)).expect("a walk leg to the station");
    assert!(walk_leg.distance_m > 100.0 && walk_leg.distance_m < 300.0, "unexpected walk distance {}", walk_leg.distance_m);

    let ride_legs = itinerary.legs.iter().filter(|l| matches!(l.detail, LegDetail::Ride { .. })).count();
    assert_eq!(ride_legs, 1);
}

#[test]
fn required_transfer_between_routes() {
    let (graph, a, _b, c) = fixtures::three_stop_scenario();
    let config = Config::default();
    let request = PlanRequest::new(&[Point::Station(a), Point::Station(c)], hints_at(fixtures::instant(8, 0, 0), &config)).unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();

    assert_eq!(response.itineraries.len(), 1);
    let itinerary = &response.itineraries[0];
    assert_eq!(itinerary.n_transfers, 1);
    assert_eq!(itinerary.arrival_time, fixtures::instant(8, 30, 0));
    let ride_legs = itinerary.legs.iter().filter(|l| matches!(l.detail, LegDetail::Ride { .. })).count();
    assert_eq!(ride_legs, 2);
}

#[test]
fn arrive_by_finds_the_latest_feasible_departure() {
    let (graph, a, b, _trip) = fixtures::two_stop_scenario();
    let config = Config::default();
    let mut hints = hints_at(fixtures::instant(9, 0, 0), &config);
    hints.arrive_by = true;
    let request = PlanRequest::new(&[Point::Station(a), Point::Station(b)], hints).unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();

    assert_eq!(response.itineraries.len(), 1);
    let itinerary = &response.itineraries[0];
    assert!(itinerary.arrival_time <= fixtures::instant(9, 0, 0));
    assert_eq!(itinerary.arrival_time, fixtures::instant(8, 15, 0));
}

#[test]
fn cancelled_trip_yields_no_solution() {
    let (graph, a, b, trip) = fixtures::two_stop_scenario();
    let config = Config::default();
    let request = PlanRequest::new(&[Point::Station(a), Point::Station(b)], hints_at(fixtures::instant(8, 0, 0), &config)).unwrap();

    let mut overlay = FeedOverlay::default();
    overlay.cancelled_trips.insert(trip);

    let response = plan(&graph, Arc::new(overlay), &config, &request).unwrap();
    assert!(response.itineraries.is_empty());
}

#[test]
fn a_tight_visit_budget_reports_exhausted_without_erroring() {
    let (graph, first, last) = fixtures::long_walk_chain(150);
    let mut config = Config::default();
    config.max_visited_nodes = 100;

    let first_point = graph.node(first).point.unwrap();
    let last_point = graph.node(last).point.unwrap();
    let request = PlanRequest::new(
        &[Point::Coordinate(first_point), Point::Coordinate(last_point)],
        hints_at(fixtures::instant(8, 0, 0), &config),
    )
    .unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();
    assert!(response.visited_nodes.sum >= 100);
}

#[test]
fn exactly_two_points_are_required() {
    let config = Config::default();
    let err = PlanRequest::new(&[Point::Station(0)], hints_at(fixtures::instant(8, 0, 0), &config)).unwrap_err();
    assert!(matches!(err, transit_router::RoutingError::InvalidArgument(_)));
}

#[test]
fn an_unparsable_departure_time_is_rejected() {
    let config = Config::default();
    let mut raw = HashMap::new();
    raw.insert("pt.earliest_departure_time".to_string(), "not-a-time".to_string());
    let err = Hints::from_raw(&raw, &config).unwrap_err();
    assert!(matches!(err, transit_router::RoutingError::InvalidArgument(_)));
}
