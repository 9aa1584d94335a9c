//! Deterministic payloads and fragment sets.

use bbqrflow::fragment::{FileType, SplitOptions, split};

/// `len` bytes cycling through every byte value.
#[must_use]
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

/// Split `payload` into exactly `parts` base32 fragments.
///
/// # Panics
///
/// Panics if the payload cannot be laid out in that many parts.
#[must_use]
pub fn split_parts(payload: &[u8], file_type: FileType, parts: u16) -> Vec<String> {
    let options = SplitOptions::default().with_split_range(parts, parts);
    split(payload, file_type, &options)
        .expect("payload splits into the requested part count")
        .into_parts()
}
