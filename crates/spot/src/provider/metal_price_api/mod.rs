//! metalpriceapi.com provider for precious metals spot prices.
//!
//! Endpoint: `https://api.metalpriceapi.com/v1/latest?api_key=...&base=USD&currencies=XAU,XAG`.
//!
//! The API reports exchange-style rates: with `base=USD`, `rates.XAU` is
//! troy ounces of metal per 1 USD. The USD-per-troy-ounce price is the
//! reciprocal; that inversion never leaves this adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};
use crate::provider::{positive_price, SpotPriceProvider};

const BASE_URL: &str = "https://api.metalpriceapi.com/v1";
const PROVIDER_ID: &str = "metalpriceapi.com";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API response from metalpriceapi.com
#[derive(Debug, Deserialize)]
struct MetalPriceResponse {
    /// Whether the request was successful
    success: bool,
    /// Rates for requested metals (metal per 1 base currency)
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// metalpriceapi.com spot price provider (market lane, query-key auth).
pub struct MetalPriceApiProvider {
    client: Client,
    api_key: String,
}

impl MetalPriceApiProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }
}

#[async_trait]
impl SpotPriceProvider for MetalPriceApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn lane(&self) -> PriceLane {
        PriceLane::Market
    }

    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError> {
        let url = format!(
            "{}/latest?api_key={}&base=USD&currencies=XAU,XAG",
            BASE_URL, self.api_key
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

        let payload: MetalPriceResponse =
            response
                .json()
                .await
                .map_err(|e| SpotError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        if !payload.success {
            return Err(SpotError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: "API reported success=false".to_string(),
            });
        }

        let rate = payload.rates.get(metal.as_str()).copied().ok_or_else(|| {
            SpotError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: format!("missing rate for {}", metal),
            }
        })?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(SpotError::InvalidPrice {
                provider: PROVIDER_ID.to_string(),
                message: format!("rate {} for {} is not invertible", rate, metal),
            });
        }

        // rate = troy ounces per USD; price = 1 / rate
        let price = positive_price(PROVIDER_ID, 1.0 / rate)?;

        Ok(SpotQuote::new(PROVIDER_ID, PriceLane::Market, price))
    }
}
