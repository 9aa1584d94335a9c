//! Codec seam between the engines and a concrete multi-part QR scheme.

use super::{Detected, FileType, FragmentHeader, JoinError, Joined, Split, SplitError, SplitOptions};

/// Split and join primitives consumed by the reassembly and playback
/// engines.
///
/// Implementations must be deterministic: identical inputs to
/// [`FragmentCodec::split`] yield identical parts, and
/// [`FragmentCodec::reassemble`] must not depend on the order of its input.
pub trait FragmentCodec {
    /// Split `payload` into ordered text fragments.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError`] when the payload cannot be laid out within
    /// `options`.
    fn split(
        &self,
        payload: &[u8],
        file_type: FileType,
        options: &SplitOptions,
    ) -> Result<Split, SplitError>;

    /// Attempt to rebuild the payload from the fragments collected so far.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::Incomplete`] when more fragments are needed and
    /// any other [`JoinError`] for structural problems.
    fn reassemble(&self, fragments: &[String]) -> Result<Joined, JoinError>;

    /// Sniff the file type of an outbound payload.
    fn detect_type(&self, payload: &[u8]) -> Detected;

    /// Series length announced by a single fragment, when the format
    /// embeds one.
    fn expected_total(&self, _fragment: &str) -> Option<usize> { None }

    /// Key shared by every fragment of one series, when the format lets
    /// fragments of different series be told apart.
    fn series_key(&self, _fragment: &str) -> Option<String> { None }
}

/// [`FragmentCodec`] speaking the BBQr format.
#[derive(Clone, Copy, Debug, Default)]
pub struct BbqrCodec;

impl FragmentCodec for BbqrCodec {
    fn split(
        &self,
        payload: &[u8],
        file_type: FileType,
        options: &SplitOptions,
    ) -> Result<Split, SplitError> {
        super::split(payload, file_type, options)
    }

    fn reassemble(&self, fragments: &[String]) -> Result<Joined, JoinError> {
        super::join(fragments)
    }

    fn detect_type(&self, payload: &[u8]) -> Detected { super::detect_type(payload) }

    fn expected_total(&self, fragment: &str) -> Option<usize> {
        FragmentHeader::parse(fragment)
            .ok()
            .map(|(header, _)| header.total().as_usize())
    }

    fn series_key(&self, fragment: &str) -> Option<String> {
        let (header, _) = FragmentHeader::parse(fragment).ok()?;
        Some(format!(
            "{}{}{}",
            header.encoding(),
            header.file_type(),
            header.total()
        ))
    }
}
