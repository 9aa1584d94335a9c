//! Transaction Inspector: pure formatting of a parsed transaction for
//! display.
//!
//! Nothing here performs I/O or keeps state; [`summarize`] and
//! [`can_finalize`] are deterministic functions of a [`ParsedTransaction`].

mod amount;
mod model;
mod summary;

pub use amount::{SATS_PER_BTC, format_btc};
pub use model::{InputInfo, OutputInfo, ParsedTransaction, SignatureStatus};
pub use summary::{OutputRole, OutputSummary, TransactionShape, TransactionSummary, can_finalize, summarize};
