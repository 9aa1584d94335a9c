//! QR symbol capacities used to size BBQr parts.

/// Smallest QR version.
pub const MIN_VERSION: u8 = 1;
/// Largest QR version.
pub const MAX_VERSION: u8 = 40;

/// Alphanumeric-mode character capacity at error correction level L,
/// indexed by `version - 1`.
const ALPHANUMERIC_L: [u16; 40] = [
    25, 47, 77, 114, 154, 195, 224, 279, 335, 395, // 1-10
    468, 535, 619, 667, 758, 854, 938, 1046, 1153, 1249, // 11-20
    1352, 1460, 1588, 1704, 1853, 1990, 2132, 2223, 2369, 2520, // 21-30
    2677, 2840, 3009, 3183, 3351, 3537, 3729, 3927, 4087, 4296, // 31-40
];

/// Characters a QR symbol of `version` holds in alphanumeric mode.
///
/// Returns `None` for versions outside `1..=40`.
///
/// # Examples
///
/// ```
/// use bbqrflow::fragment::capacity::alphanumeric_capacity;
/// assert_eq!(alphanumeric_capacity(1), Some(25));
/// assert_eq!(alphanumeric_capacity(40), Some(4296));
/// assert_eq!(alphanumeric_capacity(41), None);
/// ```
#[must_use]
pub fn alphanumeric_capacity(version: u8) -> Option<usize> {
    let slot = usize::from(version.checked_sub(MIN_VERSION)?);
    ALPHANUMERIC_L.get(slot).copied().map(usize::from)
}
