//! Multi-part capture: turn a duplicate-prone, unordered stream of decoded
//! QR text into one reassembled payload.
//!
//! [`ReassemblyEngine`] owns a single [`ReassemblyState`] at a time and only
//! exposes the documented operations. Everything recoverable (repeats,
//! missing parts, corrupt reads) is absorbed and reported through
//! [`IngestOutcome`]; only session-terminal failures surface as
//! [`ReassemblyError`].

mod engine;
mod error;
mod progress;
mod state;

pub use engine::ReassemblyEngine;
pub use error::ReassemblyError;
pub use progress::{DropReason, IngestOutcome, Progress, ReassembledPayload};
pub use state::{ReassemblyState, SessionId, SessionStatus};
