//! Lane synthesizer: derive a missing lane from the other.
//!
//! When only one lane produced data this round, the other is estimated
//! with a fixed spread fraction — retail is assumed to sit `spread` above
//! market. Nothing is ever fabricated from zero lanes, and nothing is
//! touched when both lanes are present.

use log::debug;
use rust_decimal::Decimal;

use crate::models::{LaneAggregate, PriceLane};

/// Fill in at most one absent lane.
///
/// - market only → retail = market × (1 + spread)
/// - retail only → market = retail × (1 − spread)
/// - both present or both absent → unchanged
///
/// A synthesized aggregate carries `used_synthetic = true` and no quotes.
pub fn fill_missing_lane(
    market: Option<LaneAggregate>,
    retail: Option<LaneAggregate>,
    spread: Decimal,
) -> (Option<LaneAggregate>, Option<LaneAggregate>) {
    match (market, retail) {
        (Some(market), None) => {
            let derived = market.median * (Decimal::ONE + spread);
            debug!(
                "synthesizing retail lane {} from market {} (spread {})",
                derived, market.median, spread
            );
            let retail = LaneAggregate::synthetic(PriceLane::Retail, derived);
            (Some(market), Some(retail))
        }
        (None, Some(retail)) => {
            let derived = retail.median * (Decimal::ONE - spread);
            debug!(
                "synthesizing market lane {} from retail {} (spread {})",
                derived, retail.median, spread
            );
            let market = LaneAggregate::synthetic(PriceLane::Market, derived);
            (Some(market), Some(retail))
        }
        both => both,
    }
}
