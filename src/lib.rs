#![doc(html_root_url = "https://docs.rs/bbqrflow/latest")]
//! Public API for the `bbqrflow` library.
//!
//! Building blocks for moving payloads such as PSBTs across an air gap as
//! animated multi-part QR codes: the BBQr codec, a reassembly engine for
//! scanned fragments, a playback engine for outbound fragments, frame
//! sources, and a transaction inspector.

pub mod capture;
pub mod config;
pub mod error;
pub mod fragment;
pub mod inspect;
pub mod lifecycle;
pub mod metrics;
pub mod playback;
pub mod psbt;
pub mod reassembly;
pub mod workflow;

pub use capture::{
    CaptureHandle,
    CaptureOutcome,
    CaptureReport,
    CaptureSession,
    FrameEvent,
    FrameSource,
};
pub use config::{CaptureConfig, PlaybackConfig};
pub use error::{Error, Result};
pub use fragment::{BbqrCodec, FileType, FragmentCodec, SplitOptions};
pub use inspect::{ParsedTransaction, SignatureStatus, TransactionSummary, can_finalize, summarize};
pub use lifecycle::{Lifecycle, Suspend, Visibility};
pub use playback::{CodeRenderer, PlaybackEngine, QrTextRenderer};
pub use reassembly::{IngestOutcome, Progress, ReassembledPayload, ReassemblyEngine};
pub use workflow::SigningWorkflow;
