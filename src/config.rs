//! Process-wide defaults, loaded from the environment the way the teacher's
//! binaries read `RUST_LOG` for `env_logger`. Nothing here is per-query; the
//! per-query knobs live in [`crate::request::Hints`].

/// Cooperative visit budget default (§5): 1,000,000 nodes.
pub const DEFAULT_MAX_VISITED_NODES: u64 = 1_000_000;

/// Default transfer buffer applied at every stop, in seconds, absent a
/// per-stop override (mirrors the teacher's `default_transfer_time` argument
/// to `Network::new`).
pub const DEFAULT_TRANSFER_TIME_S: u32 = 3 * 60;

/// Default pedestrian speed, km/h (§6 `pt.walk_speed`).
pub const DEFAULT_WALK_SPEED_KMH: f64 = 5.0;

/// Default cap on how far a query point may be snapped to a walk node before
/// it's considered unreachable (`PointNotFound`).
pub const DEFAULT_MAX_SNAP_DISTANCE_M: f64 = 2_000.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_visited_nodes: u64,
    pub default_transfer_time_s: u32,
    pub default_walk_speed_kmh: f64,
    pub max_snap_distance_m: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_visited_nodes: DEFAULT_MAX_VISITED_NODES,
            default_transfer_time_s: DEFAULT_TRANSFER_TIME_S,
            default_walk_speed_kmh: DEFAULT_WALK_SPEED_KMH,
            max_snap_distance_m: DEFAULT_MAX_SNAP_DISTANCE_M,
        }
    }
}

impl Config {
    /// Reads overrides from `TRANSIT_ROUTER_*` environment variables,
    /// falling back to the compiled-in defaults on anything unset or
    /// unparsable (logged at `warn`, not fatal - this is process bring-up,
    /// not a query).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = Self::env_u64("TRANSIT_ROUTER_MAX_VISITED_NODES") {
            config.max_visited_nodes = v;
        }
        if let Some(v) = Self::env_u64("TRANSIT_ROUTER_DEFAULT_TRANSFER_TIME_S") {
            config.default_transfer_time_s = v as u32;
        }
        if let Some(v) = Self::env_f64("TRANSIT_ROUTER_DEFAULT_WALK_SPEED_KMH") {
            config.default_walk_speed_kmh = v;
        }
        if let Some(v) = Self::env_f64("TRANSIT_ROUTER_MAX_SNAP_DISTANCE_M") {
            config.max_snap_distance_m = v;
        }
        config
    }

    fn env_u64(key: &str) -> Option<u64> {
        match std::env::var(key) {
            Ok(raw) => match raw.parse() {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("ignoring {key}={raw:?}: {e}");
                    None
                }
            },
            Err(_) => None,
        }
    }

    fn env_f64(key: &str) -> Option<f64> {
        match std::env::var(key) {
            Ok(raw) => match raw.parse() {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("ignoring {key}={raw:?}: {e}");
                    None
                }
            },
            Err(_) => None,
        }
    }
}
