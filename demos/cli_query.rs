//! Interactive trip-planning query, grounded on the teacher's `main.rs`
//! stdin loop (prompt for stop names, read a time, print the result) -
//! generalized to the new `plan()` API and an RFC 3339 departure instant.

use std::collections::HashMap;
use std::io::{stdin, stdout, Write};
use std::sync::Arc;

use chrono::NaiveDate;
use gtfs_structures::Gtfs;

use transit_router::graph::gtfs_import;
use transit_router::itinerary::LegDetail;
use transit_router::request::{Hints, PlanRequest, Point};
use transit_router::{plan, Config, FeedOverlay};

fn prompt(label: &str) -> std::io::Result<String> {
    print!("{label}");
    stdout().flush()?;
    let mut line = String::new();
    stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let gtfs_path = std::env::args().nth(1).unwrap_or_else(|| "../gtfs/2/google_transit.zip".to_string());
    let gtfs = Gtfs::new(&gtfs_path)?;
    log::info!("GTFS loaded with {} stops, {} routes, {} trips", gtfs.stops.len(), gtfs.routes.len(), gtfs.trips.len());

    let service_date = loop {
        let raw = prompt("Service date (YYYY-MM-DD): ")?;
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => break date,
            Err(e) => println!("Invalid date: {e}"),
        }
    };

    let graph = gtfs_import::build_base_graph(&gtfs, service_date);
    graph.print_stats();
    let config = Config::from_env();
    let overlay = Arc::new(FeedOverlay::default());

    loop {
        let origin_name = prompt("Origin stop id: ")?;
        let Some(origin_id) = graph.get_stop_idx(&origin_name) else {
            println!("Stop {origin_name:?} not found.");
            continue;
        };
        let destination_name = prompt("Destination stop id: ")?;
        let Some(destination_id) = graph.get_stop_idx(&destination_name) else {
            println!("Stop {destination_name:?} not found.");
            continue;
        };
        let departure = prompt("Departure instant (RFC 3339, e.g. 2024-03-05T08:00:00+10:00): ")?;

        let mut hints = HashMap::new();
        hints.insert("pt.earliest_departure_time".to_string(), departure);
        let hints = match Hints::from_raw(&hints, &config) {
            Ok(h) => h,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        let request = PlanRequest::new(&[Point::Station(origin_id), Point::Station(destination_id)], hints)?;

        let response = plan(&graph, overlay.clone(), &config, &request)?;
        if response.itineraries.is_empty() {
            println!("No itinerary found (exhausted: {}).", response.exhausted);
            continue;
        }

        for (i, itinerary) in response.itineraries.iter().enumerate() {
            println!(
                "--- Itinerary {} ({} transfers, {} travel time) ---",
                i + 1,
                itinerary.n_transfers,
                transit_router::utils::get_time_str((itinerary.arrival_time - itinerary.departure_time) as u32)
            );
            for leg in &itinerary.legs {
                match &leg.detail {
                    LegDetail::Walk => println!("  walk {:.0}m", leg.distance_m),
                    LegDetail::Transfer => println!("  transfer {:.0}m", leg.distance_m),
                    LegDetail::Ride { route, stop_events, .. } => {
                        println!(
                            "  ride route {route} from stop {} to stop {} ({}s)",
                            stop_events.first().map(|e| e.stop_id).unwrap_or_default(),
                            stop_events.last().map(|e| e.stop_id).unwrap_or_default(),
                            leg.end_time - leg.start_time
                        );
                    }
                }
            }
        }
        println!("Visited nodes this query: {}", response.visited_nodes.sum);
    }
}
