//! Playback and rendering failures.

use thiserror::Error;

/// Errors returned by [`PlaybackEngine`](super::PlaybackEngine).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// `load` was given no fragments, or `start` ran before `load`.
    #[error("no fragments loaded for playback")]
    Empty,
    /// `start` was called outside a Tokio runtime.
    #[error("playback timer requires a running Tokio runtime")]
    NoRuntime,
}
