//! metals-api.com provider for precious metals spot prices.
//!
//! Endpoint: `https://metals-api.com/api/latest?access_key=...&base=USD&symbols={XAU|XAG}`.
//!
//! Same inverted-rate convention as metalpriceapi.com: `rates.XAU` is
//! metal per 1 USD, so the price is the reciprocal. Failures come back as
//! HTTP 200 with `success=false` and a nested error object.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};
use crate::provider::{positive_price, SpotPriceProvider};

const BASE_URL: &str = "https://metals-api.com/api";
const PROVIDER_ID: &str = "metals-api.com";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API response from metals-api.com
#[derive(Debug, Deserialize)]
struct MetalsApiResponse {
    success: bool,
    #[serde(default)]
    rates: HashMap<String, f64>,
    #[serde(default)]
    error: Option<MetalsApiError>,
}

/// Error object returned on success=false
#[derive(Debug, Deserialize)]
struct MetalsApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    info: Option<String>,
}

/// metals-api.com spot price provider (market lane, query-key auth).
pub struct MetalsApiProvider {
    client: Client,
    access_key: String,
}

impl MetalsApiProvider {
    pub fn new(access_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, access_key }
    }
}

#[async_trait]
impl SpotPriceProvider for MetalsApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn lane(&self) -> PriceLane {
        PriceLane::Market
    }

    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError> {
        let url = format!(
            "{}/latest?access_key={}&base=USD&symbols={}",
            BASE_URL,
            urlencoding::encode(&self.access_key),
            metal
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

        let payload: MetalsApiResponse =
            response
                .json()
                .await
                .map_err(|e| SpotError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        if !payload.success {
            // The API signals quota exhaustion in-band (code 104) on a 200
            if payload.error.as_ref().and_then(|e| e.code) == Some(104) {
                return Err(SpotError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            let info = payload
                .error
                .and_then(|e| e.info)
                .unwrap_or_else(|| "API reported success=false".to_string());
            return Err(SpotError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: info,
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

        let price = positive_price(PROVIDER_ID, 1.0 / rate)?;

        Ok(SpotQuote::new(PROVIDER_ID, PriceLane::Market, price))
    }
}
