//! The base graph (§3): a directed multigraph of walk nodes and the
//! per-stop time-expanded subgraph, built once at load time and read-only
//! for the lifetime of the process.

pub mod edge_cost;
pub mod gtfs_import;
pub mod walk_network;

use std::collections::HashMap;

use chrono::NaiveDate;

/// Seconds since the Unix epoch - an absolute instant. This is what `Label::time`
/// is measured in, so the search can cross midnight (and service-day
/// boundaries) without special-casing.
pub type Instant = i64;

/// Seconds since midnight on a service day, as GTFS `stop_times` express them
/// (can exceed 86400 for trips that run past midnight).
pub type SecondsOfDay = u32;

pub type NodeId = u32;
pub type EdgeId = u32;
pub type StopId = u32;
pub type TripId = u32;
pub type RouteId = u32;

/// Edge classification (§3 / §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Highway,
    EnterPt,
    ExitPt,
    EnterTimeExpandedNetwork,
    LeaveTimeExpandedNetwork,
    StopNodeMarker,
    StopEnterNode,
    StopExitNode,
    Hop,
    Dwell,
    Board,
    Alight,
    Overnight,
    Transfer,
    Wait,
    WaitArrival,
}

/// A point on the earth, in degrees. Distance uses the teacher's
/// equirectangular-projection shortcut (`NetworkPoint::distance`), which is
/// accurate enough at walking-network scale and much cheaper than haversine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    fn equirectangular_delta(self, other: GeoPoint) -> (f64, f64) {
        let x = (other.lon - self.lon).to_radians()
            * ((other.lat + self.lat) * 0.5).to_radians().cos();
        let y = (other.lat - self.lat).to_radians();
        (x * Self::EARTH_RADIUS_M, y * Self::EARTH_RADIUS_M)
    }

    /// Distance in meters.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let (x, y) = self.equirectangular_delta(other);
        (x * x + y * y).sqrt()
    }
}

/// A service-day validity bitset for transit edges, indexed relative to the
/// graph's `service_date` (§3). Bit `i` set means the edge is valid on
/// `service_date + i days`. A plain `u64` bounds us to a ~64-day horizon,
/// which comfortably covers one GTFS feed's `calendar`/`calendar_dates`
/// validity window for a single build; a production loader spanning a
/// longer horizon would widen this to a `Vec<u64>` the way the teacher's
/// `StopBitfield` widens to a `bnum::BUint` for wide routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceDays(pub u64);

impl ServiceDays {
    pub const EVERY_DAY: ServiceDays = ServiceDays(u64::MAX);

    pub fn single_day(offset: u32) -> Self {
        ServiceDays(1u64.checked_shl(offset).unwrap_or(0))
    }

    pub fn is_active(&self, day_offset: i64) -> bool {
        if day_offset < 0 || day_offset >= 64 {
            return false;
        }
        (self.0 >> day_offset) & 1 == 1
    }

    pub fn with_day(mut self, offset: u32) -> Self {
        if offset < 64 {
            self.0 |= 1u64 << offset;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A street-network node (pedestrian graph). Also used as the access
    /// point co-located with a stop when no separate walk network models
    /// its immediate surroundings.
    Walk,
    /// The single per-stop hub node. Plays the combined role of
    /// `STOP_ENTER_NODE`/`STOP_EXIT_NODE`/the plain stop node from §3: every
    /// `ENTER_PT`/`EXIT_PT`/`TRANSFER`/`BOARD`/`ALIGHT` edge for this stop is
    /// incident to it. A production system split across three nodes to keep
    /// forward/reverse adjacency from overlapping; collapsing them here
    /// costs nothing for a single-worker query (see DESIGN.md).
    StopPlatform(StopId),
    /// A scheduled departure event: boarding a specific trip at a specific
    /// stop-sequence position.
    TripDeparture { trip: TripId, seq: u32 },
    /// A scheduled arrival event.
    TripArrival { trip: TripId, seq: u32 },
}

#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub kind: NodeKind,
    pub point: Option<GeoPoint>,
    pub out_edges: Vec<EdgeId>,
    pub in_edges: Vec<EdgeId>,
}

impl NodeRecord {
    fn new(kind: NodeKind, point: Option<GeoPoint>) -> Self {
        Self {
            kind,
            point,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    /// Interpretation depends on `kind` - see the §4.2 table. For `Board`/
    /// `Alight` this is the scheduled seconds-of-day of the event (used for
    /// the earliest/latest-feasible binary search, not as a fixed delta).
    pub time: i64,
    pub distance_m: f64,
    pub validity: Option<ServiceDays>,
    /// Companion edge walked in the opposite direction, when one exists.
    pub reverse_edge: Option<EdgeId>,
}

#[derive(Debug, Clone)]
pub struct StopRecord {
    pub id: Box<str>,
    pub name: Box<str>,
    pub platform_node: NodeId,
    pub point: GeoPoint,
    /// `Board` edges out of `platform_node`, sorted ascending by `time`
    /// (scheduled departure seconds-of-day) so `GraphExplorer` can binary
    /// search for the earliest feasible departure.
    pub board_edges: Vec<EdgeId>,
    /// `Alight` edges into `platform_node`, sorted ascending by `time`
    /// (scheduled arrival seconds-of-day), used symmetrically in reverse
    /// searches to find the latest feasible arrival.
    pub alight_edges: Vec<EdgeId>,
}

#[derive(Debug, Clone)]
pub struct TripRecord {
    pub id: Box<str>,
    pub route: RouteId,
    pub headsign: Option<Box<str>>,
    pub service_days: ServiceDays,
    /// The stop visited at each sequence position, in board/alight order -
    /// `TripReconstruction` uses this to label the stop events of a ride leg,
    /// since the time-expanded `TripDeparture`/`TripArrival` nodes carry a
    /// `seq` but not the stop itself.
    pub stops: Vec<StopId>,
}

#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub id: Box<str>,
    pub short_name: Box<str>,
}

pub struct BaseGraph {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub stops: Vec<StopRecord>,
    pub stop_index: HashMap<String, StopId>,
    pub trips: Vec<TripRecord>,
    pub trip_index: HashMap<String, TripId>,
    pub routes: Vec<RouteRecord>,
    pub walk_nodes: Vec<NodeId>,
    /// Day zero for converting GTFS seconds-of-day into absolute instants.
    pub service_date: NaiveDate,
}

impl BaseGraph {
    pub fn new(service_date: NaiveDate) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            stops: Vec::new(),
            stop_index: HashMap::new(),
            trips: Vec::new(),
            trip_index: HashMap::new(),
            routes: Vec::new(),
            walk_nodes: Vec::new(),
            service_date,
        }
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn node(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id as usize]
    }

    pub fn edge(&self, id: EdgeId) -> &EdgeRecord {
        &self.edges[id as usize]
    }

    pub fn stop(&self, id: StopId) -> &StopRecord {
        &self.stops[id as usize]
    }

    pub fn add_node(&mut self, kind: NodeKind, point: Option<GeoPoint>) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(NodeRecord::new(kind, point));
        if kind == NodeKind::Walk {
            self.walk_nodes.push(id);
        }
        id
    }

    /// Adds a single directed edge, returning its id. Most edge kinds in the
    /// time-expanded subgraph are naturally one-directional (you `Board`
    /// forward in time, never backward); reverse traversal is handled by
    /// `in_edges`, not by materializing a mirror edge.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        time: i64,
        distance_m: f64,
        validity: Option<ServiceDays>,
    ) -> EdgeId {
        let id = self.edges.len() as EdgeId;
        self.edges.push(EdgeRecord {
            from,
            to,
            kind,
            time,
            distance_m,
            validity,
            reverse_edge: None,
        });
        self.nodes[from as usize].out_edges.push(id);
        self.nodes[to as usize].in_edges.push(id);
        id
    }

    /// Adds a symmetric pair of edges of the same kind (used for `HIGHWAY`
    /// and precomputed `TRANSFER` edges, which are walkable in either
    /// direction with the same cost).
    pub fn add_edge_pair(
        &mut self,
        a: NodeId,
        b: NodeId,
        kind: EdgeKind,
        time: i64,
        distance_m: f64,
    ) -> (EdgeId, EdgeId) {
        let ab = self.add_edge(a, b, kind, time, distance_m, None);
        let ba = self.add_edge(b, a, kind, time, distance_m, None);
        self.edges[ab as usize].reverse_edge = Some(ba);
        self.edges[ba as usize].reverse_edge = Some(ab);
        (ab, ba)
    }

    pub fn get_stop_idx(&self, stop_id: &str) -> Option<StopId> {
        self.stop_index.get(stop_id).copied()
    }

    pub fn print_stats(&self) {
        log::info!(
            "BaseGraph has {} nodes, {} edges, {} stops, {} trips, {} routes.",
            self.nodes.len(),
            self.edges.len(),
            self.stops.len(),
            self.trips.len(),
            self.routes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equirectangular_distance_matches_known_pair() {
        // West Richmond / North Richmond, Melbourne - same fixture the
        // teacher used to validate `NetworkPoint::distance`.
        let west_richmond = GeoPoint { lat: -37.8149489647782, lon: 144.991422784199 };
        let north_richmond = GeoPoint { lat: -37.8103983564789, lon: 144.992500261754 };
        let distance = west_richmond.distance_m(north_richmond);
        assert!((distance - 514.6).abs() < 100.0);
    }

    #[test]
    fn service_days_bit_roundtrip() {
        let days = ServiceDays::default().with_day(0).with_day(3);
        assert!(days.is_active(0));
        assert!(!days.is_active(1));
        assert!(days.is_active(3));
        assert!(!days.is_active(64));
    }
}
