//! Universal invariants from §8, checked against the seed fixtures rather
//! than generated inputs - `fixtures` only offers a handful of scenarios, so
//! these are example-based checks of properties that would otherwise need a
//! property-testing harness this crate doesn't carry a dependency for.

use std::sync::Arc;

use transit_router::itinerary::LegDetail;
use transit_router::overlay::FeedOverlay;
use transit_router::request::{Hints, PlanRequest, Point};
use transit_router::{plan, Config};

#[test]
fn leg_instants_are_monotone_and_chain_together() {
    let (graph, a, _b, c) = fixtures::three_stop_scenario();
    let config = Config::default();
    let request = PlanRequest::new(&[Point::Station(a), Point::Station(c)], Hints::new(fixtures::instant(8, 0, 0), &config)).unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();
    let itinerary = &response.itineraries[0];

    let mut previous_end = itinerary.departure_time;
    for leg in &itinerary.legs {
        assert!(leg.start_time >= previous_end, "leg started before the previous one ended");
        assert!(leg.end_time >= leg.start_time);
        previous_end = leg.end_time;
    }
    assert_eq!(previous_end, itinerary.arrival_time);
}

#[test]
fn ride_leg_count_matches_transfer_count_plus_one() {
    let (graph, a, _b, c) = fixtures::three_stop_scenario();
    let config = Config::default();
    let request = PlanRequest::new(&[Point::Station(a), Point::Station(c)], Hints::new(fixtures::instant(8, 0, 0), &config)).unwrap();

    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();
    let itinerary = &response.itineraries[0];

    let ride_legs = itinerary.legs.iter().filter(|l| matches!(l.detail, LegDetail::Ride { .. })).count();
    assert_eq!(ride_legs as u32, itinerary.n_transfers + 1);
}

#[test]
fn walk_budget_is_respected_on_every_leg() {
    let (graph, _a, b, _trip) = fixtures::two_stop_scenario();
    let config = Config::default();
    let mut hints = Hints::new(fixtures::instant(8, 0, 0), &config);
    hints.max_walk_distance_per_leg = 50.0; // tighter than the ~200 m walk to A.

    let request = PlanRequest::new(&[Point::Coordinate(fixtures::near_stop_a()), Point::Station(b)], hints).unwrap();
    let response = plan(&graph, Arc::new(FeedOverlay::default()), &config, &request).unwrap();

    assert!(response.itineraries.is_empty(), "a 50m budget should reject the ~200m walk to the station");
}

#[test]
fn direction_symmetry_between_forward_and_arrive_by() {
    let (graph, a, b, _trip) = fixtures::two_stop_scenario();
    let config = Config::default();

    let forward_request = PlanRequest::new(&[Point::Station(a), Point::Station(b)], Hints::new(fixtures::instant(8, 0, 0), &config)).unwrap();
    let forward = plan(&graph, Arc::new(FeedOverlay::default()), &config, &forward_request).unwrap();
    let forward_departure = forward.itineraries[0].departure_time;
    let arrival = forward.itineraries[0].arrival_time;

    let mut reverse_hints = Hints::new(arrival, &config);
    reverse_hints.arrive_by = true;
    let reverse_request = PlanRequest::new(&[Point::Station(a), Point::Station(b)], reverse_hints).unwrap();
    let reverse = plan(&graph, Arc::new(FeedOverlay::default()), &config, &reverse_request).unwrap();

    // The forward search's itinerary already achieves `arrival` departing at
    // `forward_departure`; the reverse (latest-feasible-departure) search
    // toward the same `arrival` deadline can only do as well or better.
    assert!(reverse.itineraries[0].departure_time <= forward_departure);
}
