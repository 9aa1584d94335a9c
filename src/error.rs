//! Canonical error and result types for the crate.
//!
//! Each subsystem keeps its own error enum; [`Error`] gathers them for
//! callers that drive several subsystems, such as the CLI.

use thiserror::Error;

use crate::{
    capture::CaptureError,
    fragment::{FileType, HeaderError, JoinError, SplitError},
    playback::{PlaybackError, RenderError},
    psbt::{FinalizeError, PsbtError},
    reassembly::ReassemblyError,
    workflow::WorkflowError,
};

/// Top-level error type exposed by `bbqrflow`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Join(#[from] JoinError),
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error(transparent)]
    Psbt(#[from] PsbtError),
    #[error(transparent)]
    Finalize(#[from] FinalizeError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// A payload expected to be a transaction has another type.
    #[error("{} is not a transaction", .0.label())]
    NotTransaction(FileType),
    #[error("invalid transaction: {0}")]
    Transaction(#[from] bitcoin::consensus::encode::Error),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading or writing payloads failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
