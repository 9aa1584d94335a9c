//! Inbound helper that stitches BBQr parts back into a payload.
//!
//! Parts may arrive in any order and may repeat. Every header must agree
//! with the first part on encoding, file type and total, and every body
//! must decode on its own; bodies are then concatenated in index order and
//! decoded once.

use super::{Encoding, FileType, FragmentHeader, JoinError};

/// Payload recovered from a complete series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Joined {
    file_type: FileType,
    encoding: Encoding,
    payload: Vec<u8>,
}

impl Joined {
    /// Construct a joined payload.
    #[must_use]
    pub fn new(file_type: FileType, encoding: Encoding, payload: Vec<u8>) -> Self {
        Self {
            file_type,
            encoding,
            payload,
        }
    }

    /// File type announced by the series.
    #[must_use]
    pub const fn file_type(&self) -> FileType { self.file_type }

    /// Encoding the series used on the wire.
    #[must_use]
    pub const fn encoding(&self) -> Encoding { self.encoding }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.payload.as_slice() }

    /// Consume the value, returning the payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> { self.payload }
}

/// Join `parts` into the original payload.
///
/// # Examples
///
/// ```
/// use bbqrflow::fragment::{FileType, SplitOptions, join, split};
/// let parts = split(b"hello world", FileType::UnicodeText, &SplitOptions::default())
///     .expect("split")
///     .into_parts();
/// let joined = join(&parts).expect("join");
/// assert_eq!(joined.payload(), b"hello world");
/// assert_eq!(joined.file_type(), FileType::UnicodeText);
/// ```
///
/// # Errors
///
/// Returns [`JoinError::Incomplete`] while parts are missing, and the other
/// [`JoinError`] variants for malformed, inconsistent or undecodable parts.
pub fn join<S: AsRef<str>>(parts: &[S]) -> Result<Joined, JoinError> {
    let Some(first) = parts.first() else {
        return Err(JoinError::Empty);
    };
    let (lead, _) = FragmentHeader::parse(first.as_ref())
        .map_err(|source| JoinError::Header {
            position: 0,
            source,
        })?;

    let encoding = lead.encoding();
    let last = lead.total().as_usize().saturating_sub(1);
    let mut slots: Vec<Option<(usize, &str)>> = vec![None; lead.total().as_usize()];
    for (position, part) in parts.iter().enumerate() {
        let (header, body) = FragmentHeader::parse(part.as_ref())
            .map_err(|source| JoinError::Header { position, source })?;
        if let Some(field) = lead.mismatch(&header) {
            return Err(JoinError::Inconsistent { position, field });
        }
        let index = header.index();
        let Some(slot) = slots.get_mut(index.as_usize()) else {
            return Err(JoinError::Inconsistent {
                position,
                field: super::HeaderField::Index,
            });
        };
        encoding
            .check_body(body, index.as_usize() == last)
            .map_err(|reason| JoinError::Body {
                position,
                index: index.get(),
                reason,
            })?;
        match slot {
            Some((existing, held)) if *held != body => {
                return Err(JoinError::Conflict {
                    index: index.get(),
                    position,
                    existing: *existing,
                });
            }
            Some(_) => {}
            None => *slot = Some((position, body)),
        }
    }

    let have = slots.iter().filter(|slot| slot.is_some()).count();
    if have < slots.len() {
        return Err(JoinError::Incomplete {
            have,
            expected: slots.len(),
        });
    }

    let text: String = slots.into_iter().flatten().map(|(_, body)| body).collect();
    let payload = encoding.decode(&text)?;
    Ok(Joined::new(lead.file_type(), encoding, payload))
}
