//! Base36 part numbering carried in BBQr headers.
//!
//! Both the series length and the zero-based part position are written as
//! two base36 digits (`0-9A-Z`), which caps a series at 1295 parts.

use derive_more::Display;

/// Largest value two base36 digits can carry.
pub const MAX_PARTS: u16 = 36 * 36 - 1;

const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Zero-based position of a part within its series.
///
/// # Examples
///
/// ```
/// use bbqrflow::fragment::PartIndex;
/// let index = PartIndex::new(35).expect("within range");
/// assert_eq!(index.to_string(), "35");
/// assert!(PartIndex::new(1296).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct PartIndex(u16);

impl PartIndex {
    /// Construct an index, returning `None` when it exceeds [`MAX_PARTS`].
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value > MAX_PARTS {
            return None;
        }
        Some(Self(value))
    }

    /// Return the first valid part index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Return the index as a `usize` for slice addressing.
    #[must_use]
    pub fn as_usize(self) -> usize { usize::from(self.0) }
}

impl TryFrom<usize> for PartIndex {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(value)
    }
}

/// Number of parts in a series, always in `1..=MAX_PARTS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct PartTotal(u16);

impl PartTotal {
    /// Construct a total, returning `None` for zero or values above [`MAX_PARTS`].
    #[must_use]
    pub const fn new(value: u16) -> Option<Self> {
        if value == 0 || value > MAX_PARTS {
            return None;
        }
        Some(Self(value))
    }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Return the total as a `usize`.
    #[must_use]
    pub fn as_usize(self) -> usize { usize::from(self.0) }

    /// Report whether `index` addresses a part of this series.
    #[must_use]
    pub const fn contains(self, index: PartIndex) -> bool { index.0 < self.0 }
}

impl TryFrom<usize> for PartTotal {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(value)
    }
}

/// Append `value` to `out` as two upper-case base36 digits.
pub(crate) fn push_base36(out: &mut String, value: u16) {
    let value = usize::from(value.min(MAX_PARTS));
    out.push(char::from(DIGITS[value / 36]));
    out.push(char::from(DIGITS[value % 36]));
}

/// Parse exactly two base36 digits, accepting either letter case.
pub(crate) fn parse_base36(digits: &str) -> Option<u16> {
    if digits.len() != 2 {
        return None;
    }
    digits.chars().try_fold(0u16, |acc, ch| {
        let digit = u16::try_from(ch.to_digit(36)?).ok()?;
        Some(acc * 36 + digit)
    })
}
