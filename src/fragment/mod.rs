//! BBQr fragment codec used to move binary payloads through animated QR codes.
//!
//! This module collects the domain types used by the split and join layer.
//! Each sub-module focuses on a single concept (header layout, part
//! numbering, payload encodings, file types) while the crate root re-exports
//! a cohesive API. The engines elsewhere in the crate only talk to the
//! [`FragmentCodec`] trait so alternative codecs can be swapped in.

pub mod capacity;
pub mod codec;
pub mod detect;
pub mod encoding;
pub mod error;
pub mod file_type;
pub mod header;
pub mod index;
pub mod joiner;
pub mod splitter;

pub use codec::{BbqrCodec, FragmentCodec};
pub use detect::{Detected, PSBT_MAGIC, detect_type};
pub use encoding::Encoding;
pub use error::{HeaderError, HeaderField, JoinError, SplitError};
pub use file_type::FileType;
pub use header::{BBQR_MAGIC, FragmentHeader, HEADER_LEN};
pub use index::{MAX_PARTS, PartIndex, PartTotal};
pub use joiner::{Joined, join};
pub use splitter::{Split, SplitOptions, split};
