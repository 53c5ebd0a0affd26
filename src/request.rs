//! Request/response shapes (§6). Plain Rust values - this crate stops at
//! `plan()`'s return value and never chooses a wire format (§6: "response
//! serialization remains out of scope"); a caller that wants JSON enables
//! `serde` on these types at the edge, not here.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{RoutingError, RoutingResult};
use crate::graph::{GeoPoint, Instant, StopId};
use crate::itinerary::Itinerary;

/// One endpoint of a request: either a free coordinate (snapped via the
/// spatial index) or a named station.
#[derive(Debug, Clone, Copy)]
pub enum Point {
    Coordinate(GeoPoint),
    Station(StopId),
}

/// The recognized `pt.*` hint keys (§6), already parsed and defaulted - the
/// table itself lives in `Hints::from_raw`'s doc comment, not repeated here.
#[derive(Debug, Clone, Copy)]
pub struct Hints {
    pub earliest_departure_time: Instant,
    pub arrive_by: bool,
    pub profile_query: bool,
    pub ignore_transfers: bool,
    pub limit_solutions: Option<usize>,
    pub walk_speed_kmh: f64,
    pub max_walk_distance_per_leg: f64,
    pub max_transfer_distance_per_leg: f64,
}

impl Hints {
    /// Builds a `Hints` for a plain single-criterion query: no profile
    /// window, no transfer-count pruning, one solution.
    pub fn new(earliest_departure_time: Instant, config: &Config) -> Self {
        Self {
            earliest_departure_time,
            arrive_by: false,
            profile_query: false,
            ignore_transfers: false,
            limit_solutions: Some(1),
            walk_speed_kmh: config.default_walk_speed_kmh,
            max_walk_distance_per_leg: f64::INFINITY,
            max_transfer_distance_per_leg: f64::INFINITY,
        }
    }

    /// §6's default for `pt.limit_solutions`: 5 under a profile query, 1
    /// under `ignore_transfers`, otherwise unbounded.
    pub fn default_limit_solutions(profile_query: bool, ignore_transfers: bool) -> Option<usize> {
        if profile_query {
            Some(5)
        } else if ignore_transfers {
            Some(1)
        } else {
            None
        }
    }

    pub fn walk_speed_mps(&self) -> f64 {
        self.walk_speed_kmh * 1000.0 / 3600.0
    }

    /// Parses the `pt.*` hint map (§6) - an RFC 3339 instant for the
    /// required `pt.earliest_departure_time`, everything else defaulted per
    /// the table and overridden if present. `InvalidArgument` on anything
    /// unparsable, naming the offending key.
    pub fn from_raw(raw: &HashMap<String, String>, config: &Config) -> RoutingResult<Self> {
        let raw_time = raw
            .get("pt.earliest_departure_time")
            .ok_or_else(|| RoutingError::InvalidArgument("pt.earliest_departure_time is required".into()))?;
        let earliest_departure_time = chrono::DateTime::parse_from_rfc3339(raw_time)
            .map_err(|e| RoutingError::InvalidArgument(format!("pt.earliest_departure_time {raw_time:?}: {e}")))?
            .timestamp();

        let arrive_by = parse_bool_hint(raw, "pt.arrive_by", false)?;
        let profile_query = parse_bool_hint(raw, "pt.profile_query", false)?;
        let ignore_transfers = parse_bool_hint(raw, "pt.ignore_transfers", false)?;
        let limit_solutions = match raw.get("pt.limit_solutions") {
            Some(v) => Some(v.parse::<usize>().map_err(|e| RoutingError::InvalidArgument(format!("pt.limit_solutions {v:?}: {e}")))?),
            None => Self::default_limit_solutions(profile_query, ignore_transfers),
        };
        let walk_speed_kmh = parse_f64_hint(raw, "pt.walk_speed", config.default_walk_speed_kmh)?;
        let max_walk_distance_per_leg = parse_f64_hint(raw, "pt.max_walk_distance_per_leg", f64::INFINITY)?;
        let max_transfer_distance_per_leg = parse_f64_hint(raw, "pt.max_transfer_distance_per_leg", f64::INFINITY)?;

        Ok(Self {
            earliest_departure_time,
            arrive_by,
            profile_query,
            ignore_transfers,
            limit_solutions,
            walk_speed_kmh,
            max_walk_distance_per_leg,
            max_transfer_distance_per_leg,
        })
    }
}

fn parse_bool_hint(raw: &HashMap<String, String>, key: &str, default: bool) -> RoutingResult<bool> {
    match raw.get(key) {
        Some(v) => v.parse().map_err(|e| RoutingError::InvalidArgument(format!("{key} {v:?}: {e}"))),
        None => Ok(default),
    }
}

fn parse_f64_hint(raw: &HashMap<String, String>, key: &str, default: f64) -> RoutingResult<f64> {
    match raw.get(key) {
        Some(v) => v.parse().map_err(|e| RoutingError::InvalidArgument(format!("{key} {v:?}: {e}"))),
        None => Ok(default),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanRequest {
    pub origin: Point,
    pub destination: Point,
    pub hints: Hints,
}

impl PlanRequest {
    /// Builds a request from exactly two points in request order (§6: "exactly
    /// two points are required; otherwise the request fails with `InvalidArgument`").
    pub fn new(points: &[Point], hints: Hints) -> RoutingResult<Self> {
        match points {
            [origin, destination] => Ok(Self { origin: *origin, destination: *destination, hints }),
            _ => Err(RoutingError::InvalidArgument(format!("expected exactly 2 points, got {}", points.len()))),
        }
    }
}

/// Aggregate visit-count stats for the debug hints (§6, §9 Open Question b):
/// `sum` across every label-setting search this request ran, `average` over
/// however many of those searches contributed (one for a plain query, one
/// per departure sampled under a profile query).
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitedNodesStats {
    pub sum: u64,
    queries: u64,
}

impl VisitedNodesStats {
    pub fn record(&mut self, visited: u64) {
        self.sum += visited;
        self.queries += 1;
    }

    pub fn average(&self) -> f64 {
        if self.queries == 0 {
            0.0
        } else {
            self.sum as f64 / self.queries as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanResponse {
    /// Sorted ascending by total time (§6).
    pub itineraries: Vec<Itinerary>,
    /// Set when any contributing search hit `max_visited_nodes` (§7):
    /// non-fatal, `itineraries` may be an incomplete Pareto set.
    pub exhausted: bool,
    pub visited_nodes: VisitedNodesStats,
}

impl PlanResponse {
    pub fn no_path(visited_nodes: VisitedNodesStats, exhausted: bool) -> Self {
        Self { itineraries: Vec::new(), exhausted, visited_nodes }
    }
}
