//! Lane reducer: median + outlier rejection.
//!
//! Collapses the quotes of one lane into a single value that one skewed
//! feed cannot drag around. The sequence is fixed: median of everything,
//! band filter around that median, then median of the survivors. A
//! single-pass mean is not an acceptable substitute — one bad feed would
//! pull the result outside the accepted band.

use log::debug;
use rust_decimal::Decimal;

use crate::models::{LaneAggregate, PriceLane, SpotQuote};

/// Median of a slice: ascending sort, average of the two middle values
/// for an even count. `None` on empty input.
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
    }
}

/// Reduce one lane's quotes to a robust aggregate.
///
/// Steps:
/// 1. Empty input → `None` (the lane is absent this round).
/// 2. Median M of all prices.
/// 3. Keep quotes with |p−M|/M within `outlier_band`.
/// 4. ≥1 survivor → lane value is the median of the survivors.
/// 5. Filter rejected everything → fall back to the unfiltered median;
///    a non-empty lane never reports "no data".
pub fn reduce_lane(
    lane: PriceLane,
    quotes: Vec<SpotQuote>,
    outlier_band: Decimal,
) -> Option<LaneAggregate> {
    if quotes.is_empty() {
        return None;
    }

    let prices: Vec<Decimal> = quotes.iter().map(|q| q.price).collect();
    let center = median(&prices)?;

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for quote in quotes {
        let deviation = (quote.price - center).abs() / center;
        if deviation <= outlier_band {
            accepted.push(quote);
        } else {
            debug!(
                "{} lane: rejecting {} from {} (deviation {} > band {})",
                lane, quote.price, quote.source, deviation, outlier_band
            );
            rejected.push(quote);
        }
    }

    if accepted.is_empty() {
        // Everything rejected: use the unfiltered set rather than nothing.
        debug!(
            "{} lane: band {} rejected all {} quotes, using unfiltered median",
            lane,
            outlier_band,
            rejected.len()
        );
        return Some(LaneAggregate {
            lane,
            median: center,
            accepted: rejected,
            rejected: Vec::new(),
            used_synthetic: false,
        });
    }

    let accepted_prices: Vec<Decimal> = accepted.iter().map(|q| q.price).collect();
    let value = median(&accepted_prices)?;

    Some(LaneAggregate {
        lane,
        median: value,
        accepted,
        rejected,
        used_synthetic: false,
    })
}
