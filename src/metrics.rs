//! Metric helpers for `bbqrflow`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking fragments fed to reassembly.
pub const FRAGMENTS_TOTAL: &str = "bbqrflow_fragments_total";
/// Name of the counter tracking completed capture sessions.
pub const SESSIONS_COMPLETED: &str = "bbqrflow_sessions_completed_total";
/// Name of the counter tracking capture sessions ended by an error.
pub const SESSIONS_FAILED: &str = "bbqrflow_sessions_failed_total";
/// Name of the counter tracking playback frame advances.
pub const PLAYBACK_TICKS: &str = "bbqrflow_playback_ticks_total";
/// Name of the counter tracking failed fragment renders.
pub const RENDER_FAILURES: &str = "bbqrflow_render_failures_total";

/// What the reassembly engine did with a fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Stored in the session.
    Accepted,
    /// Already collected.
    Duplicate,
    /// Discarded as blank or corrupt.
    Dropped,
}

impl Disposition {
    /// Label value recorded for this disposition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Disposition::Accepted => "accepted",
            Disposition::Duplicate => "duplicate",
            Disposition::Dropped => "dropped",
        }
    }
}

/// Record a fragment with the given disposition.
pub fn inc_fragments(disposition: Disposition) {
    #[cfg(feature = "metrics")]
    counter!(FRAGMENTS_TOTAL, "disposition" => disposition.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = disposition;
}

/// Record a capture session that recovered its payload.
pub fn inc_sessions_completed() {
    #[cfg(feature = "metrics")]
    counter!(SESSIONS_COMPLETED).increment(1);
}

/// Record a capture session ended by a terminal error.
pub fn inc_sessions_failed() {
    #[cfg(feature = "metrics")]
    counter!(SESSIONS_FAILED).increment(1);
}

/// Record one timer-driven playback advance.
pub fn inc_playback_ticks() {
    #[cfg(feature = "metrics")]
    counter!(PLAYBACK_TICKS).increment(1);
}

/// Record a fragment that could not be rendered.
pub fn inc_render_failures() {
    #[cfg(feature = "metrics")]
    counter!(RENDER_FAILURES).increment(1);
}
