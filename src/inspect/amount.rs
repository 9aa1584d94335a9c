/// Minor units in one whole coin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Render an amount in satoshis as a coin value with eight decimals.
///
/// A lone leading zero before the decimal point is dropped.
///
/// # Examples
///
/// ```
/// use bbqrflow::inspect::format_btc;
/// assert_eq!(format_btc(500), ".00000500");
/// assert_eq!(format_btc(150_000_000), "1.50000000");
/// assert_eq!(format_btc(1_000_000_000), "10.00000000");
/// ```
#[must_use]
pub fn format_btc(sats: u64) -> String {
    let whole = sats / SATS_PER_BTC;
    let frac = sats % SATS_PER_BTC;
    if whole == 0 {
        format!(".{frac:08}")
    } else {
        format!("{whole}.{frac:08}")
    }
}
