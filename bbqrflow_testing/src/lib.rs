//! Shared fixtures for `bbqrflow` tests.
//!
//! Log capture, deterministic payloads and fragment sets, PSBT builders,
//! scripted frame sources and stub renderers.
//!
//! ```rust
//! use bbqrflow::fragment::FileType;
//! use bbqrflow_testing::{patterned_bytes, split_parts};
//!
//! let parts = split_parts(&patterned_bytes(600), FileType::Binary, 3);
//! assert_eq!(parts.len(), 3);
//! ```

pub mod logging;
pub mod macros;
pub mod payload;
pub mod psbt;
pub mod render;
pub mod source;

pub use logging::{LoggerHandle, logger};
pub use payload::{patterned_bytes, split_parts};
pub use psbt::{PsbtBuilder, SpendKind, mark_final};
pub use render::{EchoRenderer, FlakyRenderer};
pub use source::{ScriptedSource, Step};
