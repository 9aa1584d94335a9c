//! Outbound helper that splits a payload into BBQr parts.
//!
//! Every QR version in range is sized: its alphanumeric capacity minus the
//! header, rounded down to the encoding's split modulus, gives the body
//! length of each part. Among the versions whose part count lies inside the
//! configured bounds, the one with the fewest parts wins, ties going to the
//! lower version. Every part except the last is filled to capacity.

use log::debug;

use super::{
    Encoding,
    FileType,
    FragmentHeader,
    HEADER_LEN,
    MAX_PARTS,
    PartIndex,
    PartTotal,
    SplitError,
    capacity::{MAX_VERSION, MIN_VERSION, alphanumeric_capacity},
};

/// Bounds applied when choosing a QR version and part count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitOptions {
    /// Requested encoding. [`Encoding::Zlib`] falls back to
    /// [`Encoding::Base32`] when compression does not shrink the payload.
    pub encoding: Encoding,
    /// Fewest parts acceptable.
    pub min_split: u16,
    /// Most parts acceptable.
    pub max_split: u16,
    /// Smallest QR version to consider.
    pub min_version: u8,
    /// Largest QR version to consider.
    pub max_version: u8,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Base32,
            min_split: 1,
            max_split: MAX_PARTS,
            min_version: 5,
            max_version: MAX_VERSION,
        }
    }
}

impl SplitOptions {
    /// Override the requested encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Override the accepted part count range.
    #[must_use]
    pub fn with_split_range(mut self, min: u16, max: u16) -> Self {
        self.min_split = min;
        self.max_split = max;
        self
    }

    /// Override the accepted QR version range.
    #[must_use]
    pub fn with_version_range(mut self, min: u8, max: u8) -> Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    /// Check that both ranges are ordered and within protocol limits.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidSplitRange`] or
    /// [`SplitError::InvalidVersionRange`].
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.min_split == 0 || self.min_split > self.max_split || self.max_split > MAX_PARTS {
            return Err(SplitError::InvalidSplitRange {
                min: self.min_split,
                max: self.max_split,
            });
        }
        if self.min_version < MIN_VERSION
            || self.min_version > self.max_version
            || self.max_version > MAX_VERSION
        {
            return Err(SplitError::InvalidVersionRange {
                min: self.min_version,
                max: self.max_version,
            });
        }
        Ok(())
    }
}

/// Ordered parts produced for one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    version: u8,
    encoding: Encoding,
    file_type: FileType,
    parts: Vec<String>,
}

impl Split {
    /// QR version every part fits into.
    #[must_use]
    pub const fn version(&self) -> u8 { self.version }

    /// Encoding written into every header.
    #[must_use]
    pub const fn encoding(&self) -> Encoding { self.encoding }

    /// File type written into every header.
    #[must_use]
    pub const fn file_type(&self) -> FileType { self.file_type }

    /// Borrow the parts in index order.
    #[must_use]
    pub fn parts(&self) -> &[String] { self.parts.as_slice() }

    /// Number of parts.
    #[expect(clippy::len_without_is_empty, reason = "splits are never empty")]
    #[must_use]
    pub fn len(&self) -> usize { self.parts.len() }

    /// Consume the split, returning the parts.
    #[must_use]
    pub fn into_parts(self) -> Vec<String> { self.parts }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Layout {
    count: usize,
    version: u8,
    per_part: usize,
}

/// Split `payload` into BBQr parts tagged with `file_type`.
///
/// Identical inputs always produce identical parts.
///
/// # Errors
///
/// Returns [`SplitError`] for empty payloads, invalid options, or when no
/// QR version in range produces an acceptable number of parts.
pub fn split(
    payload: &[u8],
    file_type: FileType,
    options: &SplitOptions,
) -> Result<Split, SplitError> {
    options.validate()?;
    if payload.is_empty() {
        return Err(SplitError::EmptyPayload);
    }

    let (encoding, encoded) = encode_payload(payload, options.encoding)?;
    let Layout {
        count,
        version,
        per_part,
    } = choose_layout(encoded.len(), encoding.split_modulus(), options)?;

    let total = PartTotal::try_from(count).map_err(|_| SplitError::NoFit {
        encoded_len: encoded.len(),
    })?;

    let mut parts = Vec::with_capacity(count);
    let mut offset = 0usize;
    while offset < encoded.len() {
        let end = (offset + per_part).min(encoded.len());
        let index = PartIndex::try_from(parts.len()).map_err(|_| SplitError::NoFit {
            encoded_len: encoded.len(),
        })?;
        let header = FragmentHeader::new(encoding, file_type, total, index).map_err(|_| {
            SplitError::NoFit {
                encoded_len: encoded.len(),
            }
        })?;
        let mut part = String::with_capacity(HEADER_LEN + end - offset);
        header.write_to(&mut part);
        // The encoded text is ASCII, so byte offsets are char boundaries.
        part.push_str(&encoded[offset..end]);
        parts.push(part);
        offset = end;
    }

    debug!(
        "split: {} bytes as {} into {} parts at version {}",
        payload.len(),
        file_type,
        parts.len(),
        version
    );
    Ok(Split {
        version,
        encoding,
        file_type,
        parts,
    })
}

/// Encode with the requested encoding, keeping compressed output only when
/// it is shorter than plain base32.
fn encode_payload(payload: &[u8], requested: Encoding) -> Result<(Encoding, String), SplitError> {
    let encoded = requested.encode(payload)?;
    if requested != Encoding::Zlib {
        return Ok((requested, encoded));
    }
    let plain = Encoding::Base32.encode(payload)?;
    if encoded.len() < plain.len() {
        Ok((Encoding::Zlib, encoded))
    } else {
        debug!(
            "split: compression gives {} characters against {}, emitting base32",
            encoded.len(),
            plain.len()
        );
        Ok((Encoding::Base32, plain))
    }
}

fn choose_layout(
    encoded_len: usize,
    modulus: usize,
    options: &SplitOptions,
) -> Result<Layout, SplitError> {
    let accepted = usize::from(options.min_split)..=usize::from(options.max_split);
    (options.min_version..=options.max_version)
        .filter_map(|version| {
            let room = alphanumeric_capacity(version)?.checked_sub(HEADER_LEN)?;
            let per_part = room - room % modulus;
            if per_part == 0 {
                return None;
            }
            Some(Layout {
                count: encoded_len.div_ceil(per_part),
                version,
                per_part,
            })
        })
        .filter(|layout| accepted.contains(&layout.count))
        .min()
        .ok_or(SplitError::NoFit { encoded_len })
}
