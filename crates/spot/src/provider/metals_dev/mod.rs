//! metals.dev provider for precious metals reference prices.
//!
//! Endpoint: `https://api.metals.dev/v1/latest?api_key=...&currency=USD&unit=toz`.
//!
//! Prices come back under plain metal names (`metals.gold`,
//! `metals.silver`) rather than ISO codes; the mapping lives here.
//! Classified as a retail/reference feed.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};
use crate::provider::{positive_price, SpotPriceProvider};

const BASE_URL: &str = "https://api.metals.dev/v1";
const PROVIDER_ID: &str = "metals.dev";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API response from metals.dev
#[derive(Debug, Deserialize)]
struct MetalsDevResponse {
    /// "success" or "failure"
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    metals: Option<MetalsDevPrices>,
}

/// Named prices, USD per troy ounce with `unit=toz`
#[derive(Debug, Deserialize)]
struct MetalsDevPrices {
    #[serde(default)]
    gold: Option<f64>,
    #[serde(default)]
    silver: Option<f64>,
}

/// metals.dev spot price provider (retail lane, query-key auth).
pub struct MetalsDevProvider {
    client: Client,
    api_key: String,
}

impl MetalsDevProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }
}

#[async_trait]
impl SpotPriceProvider for MetalsDevProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn lane(&self) -> PriceLane {
        PriceLane::Retail
    }

    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError> {
        let url = format!(
            "{}/latest?api_key={}&currency=USD&unit=toz",
            BASE_URL,
            urlencoding::encode(&self.api_key)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SpotError::Network {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SpotError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SpotError::Http {
                provider: PROVIDER_ID.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: MetalsDevResponse =
            response
                .json()
                .await
                .map_err(|e| SpotError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        if payload.status.as_deref() == Some("failure") {
            return Err(SpotError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: "API reported status=failure".to_string(),
            });
        }

        let prices = payload
            .metals
            .ok_or_else(|| SpotError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: "missing metals map in response".to_string(),
            })?;

        let value = match metal {
            MetalCode::Xau => prices.gold,
            MetalCode::Xag => prices.silver,
        }
        .ok_or_else(|| SpotError::MalformedPayload {
            provider: PROVIDER_ID.to_string(),
            message: format!("missing {} price in metals map", metal),
        })?;

        let price = positive_price(PROVIDER_ID, value)?;

        Ok(SpotQuote::new(PROVIDER_ID, PriceLane::Retail, price))
    }
}
