//! Spot price provider trait definition.

use async_trait::async_trait;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};

/// Trait for spot price providers.
///
/// Implement this trait to add support for a new price feed. An adapter
/// makes exactly one outbound call per invocation, normalizes the
/// response into USD per troy ounce, and maps every failure mode into a
/// typed [`SpotError`]. Adapters never retry, never touch the cache, and
/// never see each other — retry policy, if desired, is layered above
/// this crate.
#[async_trait]
pub trait SpotPriceProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "gold-api.com".
    ///
    /// Used in logs and in the provenance report.
    fn id(&self) -> &'static str;

    /// The semantic lane this feed belongs to.
    ///
    /// A property of the feed itself, not of any single request: a
    /// wholesale/spot feed is [`PriceLane::Market`], a consumer/reference
    /// feed is [`PriceLane::Retail`].
    fn lane(&self) -> PriceLane;

    /// Fetch the current spot price for a metal.
    ///
    /// # Returns
    ///
    /// A normalized quote on success, or a [`SpotError`] on non-2xx HTTP,
    /// rate limiting, malformed payloads, or non-positive prices.
    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError>;
}
