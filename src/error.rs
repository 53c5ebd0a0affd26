//! Error taxonomy (§7). Mirrors the teacher's `thiserror`-derived error style
//! (see the old `JourneyError` in `journey.rs`), extended to the request-level
//! taxonomy this crate's public `plan()` entry point needs.

#[derive(thiserror::Error, Debug)]
pub enum RoutingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("point {index} could not be snapped to the walk network")]
    PointNotFound { index: usize },

    #[error("graph invariant violated: {0}")]
    Internal(String),
}

pub type RoutingResult<T> = Result<T, RoutingError>;

/// Logs and converts a violated graph invariant into an [`RoutingError::Internal`].
///
/// Per §7, `Internal` "should be impossible" - every call site names the
/// specific invariant so the log line is actionable.
pub(crate) fn internal(invariant: impl Into<String>) -> RoutingError {
    let msg = invariant.into();
    log::error!("graph invariant violated: {msg}");
    RoutingError::Internal(msg)
}
