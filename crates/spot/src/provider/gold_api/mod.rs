//! gold-api.com provider for precious metals spot prices.
//!
//! Free endpoint, no authentication required:
//! `https://api.gold-api.com/price/{XAU|XAG}`. The response carries the
//! USD-per-troy-ounce price directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};
use crate::provider::{positive_price, SpotPriceProvider};

const BASE_URL: &str = "https://api.gold-api.com";
const PROVIDER_ID: &str = "gold-api.com";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API response from gold-api.com
#[derive(Debug, Deserialize)]
struct GoldApiResponse {
    /// USD per troy ounce
    price: f64,
}

/// gold-api.com spot price provider (market lane, keyless).
pub struct GoldApiProvider {
    client: Client,
}

impl GoldApiProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for GoldApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpotPriceProvider for GoldApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn lane(&self) -> PriceLane {
        PriceLane::Market
    }

    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError> {
        let url = format!("{}/price/{}", BASE_URL, metal);

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

        let payload: GoldApiResponse =
            response
                .json()
                .await
                .map_err(|e| SpotError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        let price = positive_price(PROVIDER_ID, payload.price)?;

        Ok(SpotQuote::new(PROVIDER_ID, PriceLane::Market, price))
    }
}
