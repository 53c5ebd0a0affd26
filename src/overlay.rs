//! `FeedOverlay` (§2 / §5): the real-time adjustment snapshot consulted by
//! `GraphExplorer`. Pure data, reached only through an atomically-swapped
//! `Arc` so in-flight queries keep running against the snapshot they
//! started with (§5's "copy-on-write via an atomically swapped reference").

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::graph::{BaseGraph, EdgeKind, NodeId, RouteId, StopId, TripId};

/// Per-stop-time delay, in seconds, relative to the static schedule. Positive
/// means later than scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopTimeDelay {
    pub arrival_delay_s: i64,
    pub departure_delay_s: i64,
}

/// A single-hop service the real-time feed added that has no counterpart in
/// the static schedule (GTFS-Realtime `ScheduleRelationship::Added`) - just
/// enough trip identity for `TripReconstruction` to label a ride leg, not a
/// full multi-stop `TripRecord`.
#[derive(Debug, Clone)]
pub struct ExtraTripRecord {
    pub route: RouteId,
    pub headsign: Option<Box<str>>,
    pub from_stop: StopId,
    pub to_stop: StopId,
}

/// An edge `FeedOverlay` injects directly between two base-graph nodes,
/// bypassing the time-expanded `TripDeparture`/`TripArrival` pair a
/// statically-scheduled trip goes through. Shaped like `QueryGraph`'s
/// `VirtualEdge` (same from/to/kind/time/distance fields), plus the trip
/// identity `GraphExplorer` needs to carry through to the label.
#[derive(Debug, Clone, Copy)]
pub struct ExtraEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    pub time_s: i64,
    pub distance_m: f64,
    pub trip: TripId,
}

/// An immutable real-time snapshot: which trips are suppressed, by how much
/// each remaining trip's stop-time events have slipped, and which edges the
/// feed has added outright.
///
/// Cancellations/delays are keyed by `(trip, seq)` where `seq` is the same
/// 0-based stop-time position `gtfs_import` used when building that trip's
/// time-expanded column; `realtime::ingest_feed_message` assumes the feed's
/// `stop_sequence` is contiguous from 0, which holds for the fixtures and
/// most agency feeds but is not a GTFS-Realtime guarantee (see DESIGN.md).
///
/// Extra trips are identified by `TripId`s allocated above `graph.trips.len()`
/// (the same above-the-base-count scheme `QueryGraph` uses for virtual node
/// ids), indexing into `extra_trips` at `trip - graph.trips.len()`.
#[derive(Debug, Clone, Default)]
pub struct FeedOverlay {
    pub cancelled_trips: HashSet<TripId>,
    pub delays: HashMap<(TripId, u32), StopTimeDelay>,
    pub extra_trips: Vec<ExtraTripRecord>,
    extra_edges: Vec<ExtraEdge>,
    extra_out_index: HashMap<NodeId, Vec<usize>>,
    extra_in_index: HashMap<NodeId, Vec<usize>>,
}

impl FeedOverlay {
    pub fn is_cancelled(&self, trip: TripId) -> bool {
        self.cancelled_trips.contains(&trip)
    }

    pub fn delay_at(&self, trip: TripId, seq: u32) -> StopTimeDelay {
        self.delays.get(&(trip, seq)).copied().unwrap_or_default()
    }

    /// Adds an `ExtraTripRecord` and returns the `TripId` it is now reachable
    /// under (`graph.trips.len()` + its index in `extra_trips`).
    pub fn add_extra_trip(&mut self, graph: &BaseGraph, record: ExtraTripRecord) -> TripId {
        let trip = graph.trips.len() as TripId + self.extra_trips.len() as TripId;
        self.extra_trips.push(record);
        trip
    }

    pub fn add_extra_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, time_s: i64, distance_m: f64, trip: TripId) {
        let idx = self.extra_edges.len();
        self.extra_edges.push(ExtraEdge { from, to, kind, time_s, distance_m, trip });
        self.extra_out_index.entry(from).or_default().push(idx);
        self.extra_in_index.entry(to).or_default().push(idx);
    }

    pub fn out_extra_edges(&self, node: NodeId) -> impl Iterator<Item = &ExtraEdge> {
        self.extra_out_index.get(&node).into_iter().flatten().map(move |&i| &self.extra_edges[i])
    }

    pub fn in_extra_edges(&self, node: NodeId) -> impl Iterator<Item = &ExtraEdge> {
        self.extra_in_index.get(&node).into_iter().flatten().map(move |&i| &self.extra_edges[i])
    }

    pub fn is_extra_trip(&self, trip: TripId, graph: &BaseGraph) -> bool {
        trip as usize >= graph.trips.len()
    }

    pub fn extra_trip(&self, trip: TripId, graph: &BaseGraph) -> &ExtraTripRecord {
        &self.extra_trips[trip as usize - graph.trips.len()]
    }
}

/// Holds the current `FeedOverlay` behind a lock that is only ever taken to
/// swap the `Arc`, never to read through it - readers clone the `Arc` out
/// and release the lock immediately, the `std::sync::Arc`+`RwLock` stand-in
/// for an `ArcSwap` named in §5.
pub struct FeedOverlayStore {
    current: RwLock<Arc<FeedOverlay>>,
}

impl FeedOverlayStore {
    pub fn new(initial: FeedOverlay) -> Self {
        Self { current: RwLock::new(Arc::new(initial)) }
    }

    /// Takes a snapshot reference for a query about to start. The query
    /// keeps using this `Arc` even if `publish` swaps in a newer one midway.
    pub fn snapshot(&self) -> Arc<FeedOverlay> {
        self.current.read().expect("feed overlay lock poisoned").clone()
    }

    /// Atomically replaces the current snapshot.
    pub fn publish(&self, overlay: FeedOverlay) {
        *self.current.write().expect("feed overlay lock poisoned") = Arc::new(overlay);
    }
}

impl Default for FeedOverlayStore {
    fn default() -> Self {
        Self::new(FeedOverlay::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_survives_a_later_publish() {
        let store = FeedOverlayStore::default();
        let before = store.snapshot();
        assert!(!before.is_cancelled(3));

        let mut next = FeedOverlay::default();
        next.cancelled_trips.insert(3);
        store.publish(next);

        assert!(!before.is_cancelled(3), "earlier snapshot must not observe the later publish");
        assert!(store.snapshot().is_cancelled(3));
    }

    #[test]
    fn delay_lookup_defaults_to_zero() {
        let overlay = FeedOverlay::default();
        assert_eq!(overlay.delay_at(1, 0), StopTimeDelay::default());
    }

    #[test]
    fn extra_trip_ids_are_allocated_above_the_base_graph() {
        let graph = BaseGraph::new(chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let mut overlay = FeedOverlay::default();
        let trip = overlay.add_extra_trip(&graph, ExtraTripRecord { route: 0, headsign: None, from_stop: 0, to_stop: 1 });

        assert!(overlay.is_extra_trip(trip, &graph));
        assert_eq!(overlay.extra_trip(trip, &graph).to_stop, 1);
    }

    #[test]
    fn extra_edges_are_retrievable_from_both_ends() {
        let mut overlay = FeedOverlay::default();
        overlay.add_extra_edge(10, 20, EdgeKind::Hop, 300, 1_000.0, 7);

        assert_eq!(overlay.out_extra_edges(10).count(), 1);
        assert_eq!(overlay.in_extra_edges(20).count(), 1);
        assert_eq!(overlay.out_extra_edges(10).next().unwrap().trip, 7);
    }
}
