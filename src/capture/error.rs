//! Errors raised while driving a capture session.

use thiserror::Error;

use super::CaptureReport;
use crate::reassembly::ReassemblyError;

/// Failures of a capture session task.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The session ended with a terminal reassembly error. `report` keeps
    /// the fragments it collected.
    #[error("{source}")]
    Reassembly {
        #[source]
        source: ReassemblyError,
        report: CaptureReport,
    },
    /// `spawn` was called outside a Tokio runtime.
    #[error("capture session requires a running Tokio runtime")]
    NoRuntime,
    /// The session task panicked or was dropped by its runtime.
    #[error("capture task failed: {0}")]
    Task(String),
}

impl CaptureError {
    /// Collected state of the session, when the failure came from it.
    #[must_use]
    pub const fn report(&self) -> Option<&CaptureReport> {
        match self {
            Self::Reassembly { report, .. } => Some(report),
            Self::NoRuntime | Self::Task(_) => None,
        }
    }
}
