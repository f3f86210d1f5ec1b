//! Blend calculator: pure linear interpolation between lanes.
//!
//! No I/O, no clock, no state — identical inputs always produce the
//! identical output, regardless of which or how many providers
//! contributed upstream.

use rust_decimal::Decimal;

/// Clamp an arbitrary integer bias input to the valid [0, 100] range.
pub fn clamp_bias(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Blend the two lane values at `bias_percent`.
///
/// - both present: `market + (retail − market) × bias/100`
///   (0 → pure market, 100 → pure retail)
/// - exactly one present: that value, bias ignored
/// - neither present: `None`
pub fn blend(
    market: Option<Decimal>,
    retail: Option<Decimal>,
    bias_percent: u8,
) -> Option<Decimal> {
    let bias = Decimal::from(bias_percent.min(100));

    match (market, retail) {
        (Some(market), Some(retail)) => {
            Some(market + (retail - market) * bias / Decimal::ONE_HUNDRED)
        }
        (Some(market), None) => Some(market),
        (None, Some(retail)) => Some(retail),
        (None, None) => None,
    }
}
