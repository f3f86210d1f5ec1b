use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::SpotError;

use super::types::{MetalCode, PriceLane};

/// A single normalized quote from one provider.
///
/// Transient: quotes exist between the fetch and the lane reduction, then
/// only survive inside the provenance report.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotQuote {
    /// Provider id, e.g. "gold-api.com"
    pub source: &'static str,

    /// The semantic lane the provider belongs to
    pub lane: PriceLane,

    /// USD per troy ounce, strictly positive
    pub price: Decimal,

    /// When the adapter received the response
    pub fetched_at: DateTime<Utc>,
}

impl SpotQuote {
    pub fn new(source: &'static str, lane: PriceLane, price: Decimal) -> Self {
        Self {
            source,
            lane,
            price,
            fetched_at: Utc::now(),
        }
    }
}

/// A provider that did not produce a quote this round.
///
/// A failure is scoped to its provider and never affects the others.
#[derive(Clone, Debug)]
pub struct ProviderFailure {
    pub source: &'static str,
    pub lane: PriceLane,
    pub error: SpotError,
}

/// One lane collapsed to a robust value.
///
/// Recomputed per request, never stored.
#[derive(Clone, Debug)]
pub struct LaneAggregate {
    pub lane: PriceLane,

    /// Median of the accepted quotes (or of all quotes on filter fallback)
    pub median: Decimal,

    /// Quotes inside the outlier band (all quotes on filter fallback)
    pub accepted: Vec<SpotQuote>,

    /// Quotes outside the outlier band
    pub rejected: Vec<SpotQuote>,

    /// True when this lane was derived from the other via the spread
    pub used_synthetic: bool,
}

impl LaneAggregate {
    /// A lane fabricated from the other lane's value.
    pub fn synthetic(lane: PriceLane, median: Decimal) -> Self {
        Self {
            lane,
            median,
            accepted: Vec::new(),
            rejected: Vec::new(),
            used_synthetic: true,
        }
    }
}

/// One provider's outcome in the provenance report.
///
/// Serializable projection of quote-or-failure; the `providers` array of
/// every response is built from these.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOutcome {
    /// Provider id
    pub name: String,

    /// The provider's lane ("market" or "retail")
    pub kind: PriceLane,

    /// Whether the provider produced a usable quote
    pub ok: bool,

    /// The quoted price, present iff `ok`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    /// The failure reason, present iff not `ok`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderOutcome {
    pub fn from_quote(quote: &SpotQuote) -> Self {
        Self {
            name: quote.source.to_string(),
            kind: quote.lane,
            ok: true,
            price: Some(quote.price),
            error: None,
        }
    }

    pub fn from_failure(failure: &ProviderFailure) -> Self {
        Self {
            name: failure.source.to_string(),
            kind: failure.lane,
            ok: false,
            price: None,
            error: Some(failure.error.to_string()),
        }
    }
}

/// The engine's answer for one metal: both lane values, the blended main
/// price, and the full provenance report.
///
/// This is the unit returned to callers and cached. All price fields are
/// `None` when no provider yielded data — that is a normal steady state,
/// not an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedQuote {
    pub metal: MetalCode,

    /// Reduced (or synthesized) market-lane value, USD per troy ounce
    pub market_price: Option<Decimal>,

    /// Reduced (or synthesized) retail-lane value, USD per troy ounce
    pub retail_price: Option<Decimal>,

    /// Blend of the two lanes at `bias_percent`
    pub main_price: Option<Decimal>,

    /// The weight used for `main_price`, 0 = pure market, 100 = pure retail
    pub bias_percent: u8,

    /// Quotes that made it into a lane value
    pub used_count: u32,

    /// Quotes fetched successfully, accepted or not
    pub fetched_ok_count: u32,

    pub updated_at: DateTime<Utc>,

    /// Every provider's outcome this round
    pub providers: Vec<ProviderOutcome>,
}
