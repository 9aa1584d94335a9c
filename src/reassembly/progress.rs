//! Progress reporting and per-fragment outcomes.

use bytes::Bytes;
use serde::Serialize;

use crate::fragment::{FileType, JoinError};

/// Fragments collected so far and the best known series length.
///
/// # Examples
///
/// ```
/// use bbqrflow::reassembly::Progress;
/// assert_eq!(Progress::new(2, Some(3)).to_string(), "2/3");
/// assert_eq!(Progress::new(2, None).to_string(), "2/?");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Distinct fragments accepted into the session.
    pub collected: usize,
    /// Estimated series length, `None` while unknown.
    pub total: Option<usize>,
}

impl Progress {
    /// Construct a progress snapshot.
    #[must_use]
    pub const fn new(collected: usize, total: Option<usize>) -> Self { Self { collected, total } }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.total {
            Some(total) => write!(f, "{}/{total}", self.collected),
            None => write!(f, "{}/?", self.collected),
        }
    }
}

/// Why a fragment was not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The frame carried no text.
    Blank,
    /// The codec rejected the fragment for a structural reason.
    Corrupt(JoinError),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => f.write_str("blank fragment"),
            Self::Corrupt(err) => write!(f, "corrupt fragment: {err}"),
        }
    }
}

/// Result of feeding one fragment to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Already collected; nothing changed.
    Duplicate(Progress),
    /// Stored; more fragments are needed.
    Accepted(Progress),
    /// Stored and the payload is now complete.
    Complete(Progress),
    /// Discarded; the session continues.
    Dropped {
        /// Progress after discarding.
        progress: Progress,
        /// Reason the fragment was discarded.
        reason: DropReason,
    },
    /// The session already finished; call `reset` to capture again.
    Closed,
}

impl IngestOutcome {
    /// Whether this outcome finished the session successfully.
    #[must_use]
    pub const fn is_complete(&self) -> bool { matches!(self, Self::Complete(_)) }

    /// Progress carried by the outcome, if any.
    #[must_use]
    pub const fn progress(&self) -> Option<Progress> {
        match self {
            Self::Duplicate(progress) | Self::Accepted(progress) | Self::Complete(progress) => {
                Some(*progress)
            }
            Self::Dropped { progress, .. } => Some(*progress),
            Self::Closed => None,
        }
    }
}

/// Payload recovered by a completed session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledPayload {
    file_type: FileType,
    data: Bytes,
}

impl ReassembledPayload {
    /// Construct a payload.
    #[must_use]
    pub fn new(file_type: FileType, data: impl Into<Bytes>) -> Self {
        Self {
            file_type,
            data: data.into(),
        }
    }

    /// Type tag announced by the series.
    #[must_use]
    pub const fn file_type(&self) -> FileType { self.file_type }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] { &self.data }

    /// Cheaply cloneable handle to the payload bytes.
    #[must_use]
    pub fn bytes(&self) -> Bytes { self.data.clone() }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}
