//! Fixed eight-character header prefixed to every BBQr part.

use super::{
    Encoding,
    FileType,
    HeaderError,
    HeaderField,
    PartIndex,
    PartTotal,
    index::{parse_base36, push_base36},
};

/// Marker opening every BBQr part.
pub const BBQR_MAGIC: &str = "B$";
/// Length of the header in characters.
pub const HEADER_LEN: usize = 8;

/// Header describing a single BBQr part.
///
/// The layout is `B$`, the encoding character, the file-type character,
/// the series total and the part index (two base36 digits each).
///
/// # Examples
///
/// ```
/// use bbqrflow::fragment::{Encoding, FileType, FragmentHeader};
/// let (header, body) = FragmentHeader::parse("B$2P0301ABCDEFGH").expect("valid header");
/// assert_eq!(header.encoding(), Encoding::Base32);
/// assert_eq!(header.file_type(), FileType::Psbt);
/// assert_eq!(header.total().get(), 3);
/// assert_eq!(header.index().get(), 1);
/// assert_eq!(body, "ABCDEFGH");
/// assert_eq!(header.to_string(), "B$2P0301");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FragmentHeader {
    encoding: Encoding,
    file_type: FileType,
    total: PartTotal,
    index: PartIndex,
}

impl FragmentHeader {
    /// Create a header, checking that `index` lies within `total`.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::IndexOutOfRange`] when `index >= total`.
    pub fn new(
        encoding: Encoding,
        file_type: FileType,
        total: PartTotal,
        index: PartIndex,
    ) -> Result<Self, HeaderError> {
        if !total.contains(index) {
            return Err(HeaderError::IndexOutOfRange {
                index: index.get(),
                total: total.get(),
            });
        }
        Ok(Self {
            encoding,
            file_type,
            total,
            index,
        })
    }

    /// Split `fragment` into its header and body.
    ///
    /// # Errors
    ///
    /// Returns a [`HeaderError`] describing the first structural problem
    /// found in the eight header characters.
    pub fn parse(fragment: &str) -> Result<(Self, &str), HeaderError> {
        let Some(head) = fragment.get(..HEADER_LEN) else {
            return Err(HeaderError::TooShort {
                len: fragment.len(),
            });
        };
        let body = &fragment[HEADER_LEN..];
        if !head.starts_with(BBQR_MAGIC) {
            return Err(HeaderError::MissingMagic);
        }
        if !head.is_ascii() {
            return Err(HeaderError::NonAscii);
        }

        let mut chars = head[BBQR_MAGIC.len()..].chars();
        let encoding_code = chars.next().unwrap_or_default();
        let type_code = chars.next().unwrap_or_default();
        let encoding =
            Encoding::from_code(encoding_code).ok_or(HeaderError::UnknownEncoding(encoding_code))?;
        let file_type =
            FileType::from_code(type_code).ok_or(HeaderError::UnknownFileType(type_code))?;

        let total_digits = &head[4..6];
        let index_digits = &head[6..8];
        let total = parse_base36(total_digits).ok_or_else(|| HeaderError::InvalidDigits {
            field: HeaderField::Total,
            digits: total_digits.to_owned(),
        })?;
        let index = parse_base36(index_digits).ok_or_else(|| HeaderError::InvalidDigits {
            field: HeaderField::Index,
            digits: index_digits.to_owned(),
        })?;
        let total = PartTotal::new(total).ok_or(HeaderError::ZeroTotal)?;
        let index = PartIndex::new(index).ok_or(HeaderError::IndexOutOfRange {
            index,
            total: total.get(),
        })?;

        Ok((Self::new(encoding, file_type, total, index)?, body))
    }

    /// Return the payload encoding.
    #[must_use]
    pub const fn encoding(&self) -> Encoding { self.encoding }

    /// Return the payload file type.
    #[must_use]
    pub const fn file_type(&self) -> FileType { self.file_type }

    /// Return the number of parts in the series.
    #[must_use]
    pub const fn total(&self) -> PartTotal { self.total }

    /// Return this part's zero-based position.
    #[must_use]
    pub const fn index(&self) -> PartIndex { self.index }

    /// Report the first series-level field on which `other` disagrees.
    #[must_use]
    pub fn mismatch(&self, other: &Self) -> Option<HeaderField> {
        if self.encoding != other.encoding {
            Some(HeaderField::Encoding)
        } else if self.file_type != other.file_type {
            Some(HeaderField::FileType)
        } else if self.total != other.total {
            Some(HeaderField::Total)
        } else {
            None
        }
    }

    /// Append the header characters to `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(BBQR_MAGIC);
        out.push(self.encoding.code());
        out.push(self.file_type.code());
        push_base36(out, self.total.get());
        push_base36(out, self.index.get());
    }
}

impl std::fmt::Display for FragmentHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut head = String::with_capacity(HEADER_LEN);
        self.write_to(&mut head);
        f.write_str(&head)
    }
}
