//! Engine facade: the full per-request pipeline.
//!
//! `SpotEngine` owns the adapter list, the cache handle, and the tuning
//! knobs, and walks one request through
//! fetch → reduce → (synthesize) → blend. It never returns an error: when
//! both lanes come up empty and synthesis is impossible, the caller still
//! gets a normal [`BlendedQuote`] with null prices and the full
//! provenance report, so a UI can explain staleness instead of showing a
//! silent zero.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::aggregate;
use crate::cache::SpotCache;
use crate::coordinator;
use crate::models::{BlendedQuote, MetalCode, PriceLane, ProviderOutcome};
use crate::provider::SpotPriceProvider;

/// Tuning knobs for the aggregation pipeline.
///
/// All of these come from external configuration; the engine itself
/// never reads the environment.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Outlier band for gold, as a fraction of the lane median.
    /// Tighter than silver — gold feeds agree more closely.
    pub outlier_band_gold: Decimal,

    /// Outlier band for silver.
    pub outlier_band_silver: Decimal,

    /// Assumed retail markup over market, used only to synthesize a
    /// missing lane.
    pub synthetic_spread: Decimal,

    /// Blend weight used when the caller does not supply one.
    pub default_bias_percent: u8,

    /// Cancellation timeout applied to each adapter call.
    pub provider_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            outlier_band_gold: Decimal::new(1, 2),    // 0.01
            outlier_band_silver: Decimal::new(2, 2),  // 0.02
            synthetic_spread: Decimal::new(2, 2),     // 0.02
            default_bias_percent: 0,
            provider_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    fn outlier_band(&self, metal: MetalCode) -> Decimal {
        match metal {
            MetalCode::Xau => self.outlier_band_gold,
            MetalCode::Xag => self.outlier_band_silver,
        }
    }
}

/// Orchestrates providers, aggregation and the cache for spot requests.
pub struct SpotEngine {
    providers: Vec<Arc<dyn SpotPriceProvider>>,
    cache: Arc<dyn SpotCache>,
    config: EngineConfig,
}

impl SpotEngine {
    pub fn new(
        providers: Vec<Arc<dyn SpotPriceProvider>>,
        cache: Arc<dyn SpotCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            providers,
            cache,
            config,
        }
    }

    /// The blended spot price for one metal.
    ///
    /// `bias` overrides the configured default blend weight; any value is
    /// clamped to [0, 100]. Served from the cache when a fresh entry
    /// exists — a hit with a different bias re-runs only the pure blend
    /// over the cached lane values, so provenance and timestamp are
    /// identical across hits within the TTL and no network call is made.
    pub async fn spot_price(&self, metal: MetalCode, bias: Option<u8>) -> BlendedQuote {
        let bias = bias.unwrap_or(self.config.default_bias_percent).min(100);

        if let Some(cached) = self.cache.get(metal) {
            debug!("cache hit for {}", metal);
            return Self::reblend(cached, bias);
        }

        info!(
            "fetching {} from {} enabled providers",
            metal,
            self.providers.len()
        );
        let outcome =
            coordinator::fetch_all(&self.providers, metal, self.config.provider_timeout).await;

        // Provenance covers every provider, ok or not, before any quote
        // is consumed by reduction.
        let mut providers: Vec<ProviderOutcome> = Vec::with_capacity(
            outcome.quotes.len() + outcome.failures.len(),
        );
        providers.extend(outcome.quotes.iter().map(ProviderOutcome::from_quote));
        providers.extend(outcome.failures.iter().map(ProviderOutcome::from_failure));

        let fetched_ok_count = outcome.quotes.len() as u32;

        let mut market_quotes = Vec::new();
        let mut retail_quotes = Vec::new();
        for quote in outcome.quotes {
            match quote.lane {
                PriceLane::Market => market_quotes.push(quote),
                PriceLane::Retail => retail_quotes.push(quote),
            }
        }

        let band = self.config.outlier_band(metal);
        let market = aggregate::reduce_lane(PriceLane::Market, market_quotes, band);
        let retail = aggregate::reduce_lane(PriceLane::Retail, retail_quotes, band);

        let used_count = (market.as_ref().map_or(0, |a| a.accepted.len())
            + retail.as_ref().map_or(0, |a| a.accepted.len())) as u32;

        let (market, retail) =
            aggregate::fill_missing_lane(market, retail, self.config.synthetic_spread);

        let market_price = market.as_ref().map(|a| a.median);
        let retail_price = retail.as_ref().map(|a| a.median);
        let main_price = aggregate::blend(market_price, retail_price, bias);

        if main_price.is_none() {
            warn!(
                "{}: no lane produced data ({} failures), returning unavailable",
                metal,
                providers.len()
            );
        }

        let quote = BlendedQuote {
            metal,
            market_price,
            retail_price,
            main_price,
            bias_percent: bias,
            used_count,
            fetched_ok_count,
            updated_at: Utc::now(),
            providers,
        };

        // Best-effort: a failed write must not fail the request.
        self.cache.put(metal, quote.clone());

        quote
    }

    /// Re-run the pure blend over an already-aggregated quote.
    fn reblend(cached: BlendedQuote, bias: u8) -> BlendedQuote {
        if cached.bias_percent == bias {
            return cached;
        }

        let main_price = aggregate::blend(cached.market_price, cached.retail_price, bias);
        BlendedQuote {
            main_price,
            bias_percent: bias,
            ..cached
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemorySpotCache;
    use crate::errors::SpotError;
    use crate::models::SpotQuote;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        id: &'static str,
        lane: PriceLane,
        price: Decimal,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn new(id: &'static str, lane: PriceLane, price: Decimal) -> Arc<Self> {
            Arc::new(Self {
                id,
                lane,
                price,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SpotPriceProvider for StaticProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn lane(&self) -> PriceLane {
            self.lane
        }

        async fn fetch_spot(&self, _metal: MetalCode) -> Result<SpotQuote, SpotError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SpotQuote::new(self.id, self.lane, self.price))
        }
    }

    struct FailingProvider {
        id: &'static str,
        lane: PriceLane,
    }

    #[async_trait]
    impl SpotPriceProvider for FailingProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn lane(&self) -> PriceLane {
            self.lane
        }

        async fn fetch_spot(&self, _metal: MetalCode) -> Result<SpotQuote, SpotError> {
            Err(SpotError::Http {
                provider: self.id.to_string(),
                status: 500,
            })
        }
    }

    struct HangingProvider {
        id: &'static str,
    }

    #[async_trait]
    impl SpotPriceProvider for HangingProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn lane(&self) -> PriceLane {
            PriceLane::Market
        }

        async fn fetch_spot(&self, _metal: MetalCode) -> Result<SpotQuote, SpotError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("the coordinator should have cancelled this call");
        }
    }

    fn engine(providers: Vec<Arc<dyn SpotPriceProvider>>) -> SpotEngine {
        let config = EngineConfig {
            provider_timeout: Duration::from_millis(100),
            ..EngineConfig::default()
        };
        SpotEngine::new(providers, Arc::new(InMemorySpotCache::default()), config)
    }

    #[tokio::test]
    async fn test_partial_failure_still_yields_a_price() {
        let providers: Vec<Arc<dyn SpotPriceProvider>> = vec![
            StaticProvider::new("a", PriceLane::Market, dec!(2400)),
            StaticProvider::new("b", PriceLane::Market, dec!(2402)),
            Arc::new(HangingProvider { id: "stuck" }),
        ];

        let quote = engine(providers).spot_price(MetalCode::Xau, None).await;

        assert!(quote.main_price.is_some());
        assert_eq!(quote.fetched_ok_count, 2);
        let timed_out = quote
            .providers
            .iter()
            .find(|p| p.name == "stuck")
            .unwrap();
        assert!(!timed_out.ok);
        assert_eq!(timed_out.error.as_deref(), Some("Timeout: stuck"));
    }

    #[tokio::test]
    async fn test_total_failure_is_unavailable_not_an_error() {
        let providers: Vec<Arc<dyn SpotPriceProvider>> = vec![
            Arc::new(FailingProvider {
                id: "x",
                lane: PriceLane::Market,
            }),
            Arc::new(FailingProvider {
                id: "y",
                lane: PriceLane::Retail,
            }),
        ];

        let quote = engine(providers).spot_price(MetalCode::Xag, None).await;

        assert!(quote.main_price.is_none());
        assert!(quote.market_price.is_none());
        assert!(quote.retail_price.is_none());
        assert_eq!(quote.used_count, 0);
        assert_eq!(quote.providers.len(), 2);
        assert!(quote.providers.iter().all(|p| !p.ok && p.error.is_some()));
    }

    #[tokio::test]
    async fn test_missing_retail_lane_is_synthesized() {
        let providers: Vec<Arc<dyn SpotPriceProvider>> =
            vec![StaticProvider::new("m", PriceLane::Market, dec!(1000))];

        let quote = engine(providers).spot_price(MetalCode::Xau, None).await;

        assert_eq!(quote.market_price.unwrap(), dec!(1000));
        assert_eq!(quote.retail_price.unwrap(), dec!(1020));
        // Default bias 0 → pure market
        assert_eq!(quote.main_price.unwrap(), dec!(1000));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_providers_and_keeps_provenance() {
        let counting = StaticProvider::new("m", PriceLane::Market, dec!(2400));
        let providers: Vec<Arc<dyn SpotPriceProvider>> = vec![counting.clone()];
        let engine = engine(providers);

        let first = engine.spot_price(MetalCode::Xau, None).await;
        let second = engine.spot_price(MetalCode::Xau, None).await;

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.updated_at, second.updated_at);
        assert_eq!(first.providers.len(), second.providers.len());

        // The other metal is its own cache scope
        let _ = engine.spot_price(MetalCode::Xag, None).await;
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_with_new_bias_reblends_without_refetch() {
        let counting = StaticProvider::new("m", PriceLane::Market, dec!(1000));
        let retail = StaticProvider::new("r", PriceLane::Retail, dec!(1100));
        let providers: Vec<Arc<dyn SpotPriceProvider>> = vec![counting.clone(), retail];
        let engine = engine(providers);

        let at_market = engine.spot_price(MetalCode::Xau, Some(0)).await;
        let at_retail = engine.spot_price(MetalCode::Xau, Some(100)).await;

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(at_market.main_price.unwrap(), dec!(1000));
        assert_eq!(at_retail.main_price.unwrap(), dec!(1100));
        assert_eq!(at_market.updated_at, at_retail.updated_at);
    }

    #[tokio::test]
    async fn test_no_providers_configured() {
        let quote = engine(Vec::new()).spot_price(MetalCode::Xau, None).await;
        assert!(quote.main_price.is_none());
        assert!(quote.providers.is_empty());
        assert_eq!(quote.fetched_ok_count, 0);
    }
}
