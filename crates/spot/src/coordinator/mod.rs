//! Concurrent fetch coordinator.
//!
//! Dispatches every enabled adapter in parallel, each under its own
//! cancellation timeout, and waits for all of them to settle before
//! returning. Partial failure is the expected steady state, so the
//! coordinator never short-circuits on the first success or the first
//! error — it always collects the complete picture.

use std::sync::Arc;
use std::time::Duration;

use futures::future;
use log::{debug, warn};

use crate::errors::SpotError;
use crate::models::{MetalCode, ProviderFailure, SpotQuote};
use crate::provider::SpotPriceProvider;

/// Everything that came back from one fan-out round.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Successful quotes, tagged with source and lane
    pub quotes: Vec<SpotQuote>,
    /// Failed providers, tagged with source, lane and typed reason
    pub failures: Vec<ProviderFailure>,
}

/// Fan out to all adapters for one metal and wait for every one to settle.
///
/// Each adapter call races `timeout`; a call that loses the race is
/// cancelled (its future is dropped, aborting the in-flight request) and
/// recorded as [`SpotError::Timeout`]. Wall-clock cost is roughly the
/// slowest surviving adapter, not the sum of latencies.
pub async fn fetch_all(
    providers: &[Arc<dyn SpotPriceProvider>],
    metal: MetalCode,
    timeout: Duration,
) -> FetchOutcome {
    let calls = providers.iter().map(|provider| {
        let provider = Arc::clone(provider);
        async move {
            match tokio::time::timeout(timeout, provider.fetch_spot(metal)).await {
                Ok(Ok(quote)) => Ok(quote),
                Ok(Err(error)) => Err(ProviderFailure {
                    source: provider.id(),
                    lane: provider.lane(),
                    error,
                }),
                Err(_) => Err(ProviderFailure {
                    source: provider.id(),
                    lane: provider.lane(),
                    error: SpotError::Timeout {
                        provider: provider.id().to_string(),
                    },
                }),
            }
        }
    });

    let settled = future::join_all(calls).await;

    let mut outcome = FetchOutcome::default();
    for result in settled {
        match result {
            Ok(quote) => {
                debug!("{} quoted {} at {}", quote.source, metal, quote.price);
                outcome.quotes.push(quote);
            }
            Err(failure) => {
                warn!("{} failed for {}: {}", failure.source, metal, failure.error);
                outcome.failures.push(failure);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceLane;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct StaticProvider {
        id: &'static str,
        lane: PriceLane,
        price: Decimal,
        delay: Duration,
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
            tokio::time::sleep(self.delay).await;
            Ok(SpotQuote::new(self.id, self.lane, self.price))
        }
    }

    struct FailingProvider {
        id: &'static str,
    }

    #[async_trait]
    impl SpotPriceProvider for FailingProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn lane(&self) -> PriceLane {
            PriceLane::Market
        }

        async fn fetch_spot(&self, _metal: MetalCode) -> Result<SpotQuote, SpotError> {
            Err(SpotError::Http {
                provider: self.id.to_string(),
                status: 503,
            })
        }
    }

    #[tokio::test]
    async fn test_all_adapters_settle() {
        let providers: Vec<Arc<dyn SpotPriceProvider>> = vec![
            Arc::new(StaticProvider {
                id: "fast",
                lane: PriceLane::Market,
                price: dec!(2400),
                delay: Duration::ZERO,
            }),
            Arc::new(FailingProvider { id: "broken" }),
            Arc::new(StaticProvider {
                id: "slow-ok",
                lane: PriceLane::Retail,
                price: dec!(2450),
                delay: Duration::from_millis(20),
            }),
        ];

        let outcome = fetch_all(&providers, MetalCode::Xau, Duration::from_secs(2)).await;

        assert_eq!(outcome.quotes.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "broken");
    }

    #[tokio::test]
    async fn test_slow_adapter_times_out_without_sinking_the_round() {
        let providers: Vec<Arc<dyn SpotPriceProvider>> = vec![
            Arc::new(StaticProvider {
                id: "fast",
                lane: PriceLane::Market,
                price: dec!(2400),
                delay: Duration::ZERO,
            }),
            Arc::new(StaticProvider {
                id: "stuck",
                lane: PriceLane::Market,
                price: dec!(2500),
                delay: Duration::from_secs(30),
            }),
        ];

        let outcome = fetch_all(&providers, MetalCode::Xau, Duration::from_millis(50)).await;

        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.quotes[0].source, "fast");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "stuck");
        assert!(matches!(
            outcome.failures[0].error,
            SpotError::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_provider_list_yields_empty_outcome() {
        let providers: Vec<Arc<dyn SpotPriceProvider>> = Vec::new();
        let outcome = fetch_all(&providers, MetalCode::Xag, Duration::from_secs(1)).await;
        assert!(outcome.quotes.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
