//! Terminal failures of a capture session.

use thiserror::Error;

use crate::fragment::FileType;

/// Errors that end a capture session.
///
/// The engine stays usable; callers decide whether to
/// [`reset`](super::ReassemblyEngine::reset).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The series completed but carries a different payload type.
    #[error("reassembled payload is {found:?}, expected {expected:?}")]
    TypeMismatch { expected: FileType, found: FileType },
}
