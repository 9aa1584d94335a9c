//! Frame sources and the async driver that feeds them into reassembly.
//!
//! A [`FrameSource`] yields whatever a camera or file reader decoded; the
//! [`CaptureSession`] task pulls frames, hands decoded text to a
//! [`ReassemblyEngine`](crate::reassembly::ReassemblyEngine) and publishes
//! progress until the payload completes, the source closes, or the session
//! is stopped.

mod error;
mod session;
mod source;

pub use error::CaptureError;
pub use session::{CaptureHandle, CaptureOutcome, CaptureReport, CaptureSession, CaptureStatus};
pub use source::{ChannelSource, FileSequence, FrameEvent, FrameSource, LineSource};
