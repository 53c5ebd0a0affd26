//! Generated protobuf bindings (via `prost-build`, see `build.rs`). Mirrors
//! the teacher-adjacent `gtfs` crate's `data_model::realtime` module: a
//! single `include!` of the `OUT_DIR` file compiled from `proto/gtfs-realtime.proto`.

pub mod transit_realtime {
    include!(concat!(env!("OUT_DIR"), "/protobuf/transit_realtime.rs"));
}
