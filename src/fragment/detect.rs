//! Best-effort sniffing of a payload's file type.
//!
//! Input may be raw bytes or text that wraps them (base64 or hex, as users
//! typically paste PSBTs). When a wrapped PSBT or transaction is found the
//! unwrapped bytes are returned alongside the tag.

use base64::{Engine, engine::general_purpose::STANDARD};
use bitcoin::{Transaction, consensus};

use super::FileType;

/// Magic prefix of a serialized PSBT.
pub const PSBT_MAGIC: &[u8] = b"psbt\xff";

/// Result of sniffing a payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detected {
    file_type: FileType,
    payload: Vec<u8>,
}

impl Detected {
    fn new(file_type: FileType, payload: Vec<u8>) -> Self { Self { file_type, payload } }

    /// Tag the payload should be sent with.
    #[must_use]
    pub const fn file_type(&self) -> FileType { self.file_type }

    /// Borrow the payload, unwrapped from any text encoding.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.payload.as_slice() }

    /// Consume the value, returning the payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> { self.payload }
}

/// Guess the file type of `raw`.
///
/// # Examples
///
/// ```
/// use bbqrflow::fragment::{FileType, detect_type};
/// assert_eq!(detect_type(br#"{"a":1}"#).file_type(), FileType::Json);
/// assert_eq!(detect_type(b"plain words").file_type(), FileType::UnicodeText);
/// assert_eq!(detect_type(&[0xff, 0x00, 0x13]).file_type(), FileType::Binary);
/// ```
#[must_use]
pub fn detect_type(raw: &[u8]) -> Detected {
    if raw.starts_with(PSBT_MAGIC) {
        return Detected::new(FileType::Psbt, raw.to_vec());
    }
    match std::str::from_utf8(raw) {
        Ok(text) => detect_text(text)
            .unwrap_or_else(|| Detected::new(FileType::UnicodeText, raw.to_vec())),
        Err(_) if is_transaction(raw) => Detected::new(FileType::Transaction, raw.to_vec()),
        Err(_) => Detected::new(FileType::Binary, raw.to_vec()),
    }
}

fn detect_text(text: &str) -> Option<Detected> {
    let compact: String = text.split_whitespace().collect();
    if compact.is_empty() {
        return None;
    }
    if let Some(bytes) = STANDARD
        .decode(compact.as_bytes())
        .ok()
        .filter(|bytes| bytes.starts_with(PSBT_MAGIC))
    {
        return Some(Detected::new(FileType::Psbt, bytes));
    }
    if let Ok(bytes) = hex::decode(compact.as_bytes()) {
        if bytes.starts_with(PSBT_MAGIC) {
            return Some(Detected::new(FileType::Psbt, bytes));
        }
        if is_transaction(&bytes) {
            return Some(Detected::new(FileType::Transaction, bytes));
        }
    }
    let trimmed = text.trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
    {
        return Some(Detected::new(FileType::Json, text.as_bytes().to_vec()));
    }
    None
}

fn is_transaction(bytes: &[u8]) -> bool {
    consensus::deserialize::<Transaction>(bytes).is_ok()
}
