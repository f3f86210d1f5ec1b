//! commoditypriceapi.com provider for precious metals reference prices.
//!
//! Endpoint: `https://api.commoditypriceapi.com/v2/rates/latest?symbols={xau|xag}`
//! with an `x-api-key` header. Symbols are lowercase on this feed.
//!
//! The response shape has varied across API versions: rates arrive either
//! under `data.rates` or directly under `rates`. Both are handled here so
//! the rest of the engine never sees the difference.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};
use crate::provider::{positive_price, SpotPriceProvider};

const BASE_URL: &str = "https://api.commoditypriceapi.com/v2";
const PROVIDER_ID: &str = "commoditypriceapi.com";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API response from commoditypriceapi.com; `data.rates` and `rates`
/// variants both occur in the wild.
#[derive(Debug, Deserialize)]
struct CommodityPriceResponse {
    #[serde(default)]
    data: Option<CommodityPriceData>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct CommodityPriceData {
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// commoditypriceapi.com spot price provider (retail lane, header-key auth).
pub struct CommodityPriceApiProvider {
    client: Client,
    api_key: String,
}

impl CommodityPriceApiProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    /// Pull the rate for `symbol` out of whichever nesting the response used.
    fn extract_rate(payload: &CommodityPriceResponse, symbol: &str) -> Option<f64> {
        if let Some(rate) = payload
            .data
            .as_ref()
            .and_then(|d| d.rates.as_ref())
            .and_then(|r| r.get(symbol))
        {
            return Some(*rate);
        }

        payload.rates.as_ref().and_then(|r| r.get(symbol)).copied()
    }
}

#[async_trait]
impl SpotPriceProvider for CommodityPriceApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn lane(&self) -> PriceLane {
        PriceLane::Retail
    }

    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError> {
        let symbol = metal.as_str().to_lowercase();
        let url = format!("{}/rates/latest?symbols={}", BASE_URL, symbol);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
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

        let payload: CommodityPriceResponse =
            response
                .json()
                .await
                .map_err(|e| SpotError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        let value = Self::extract_rate(&payload, &symbol).ok_or_else(|| {
            SpotError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: format!("no rate for {} in either response shape", symbol),
            }
        })?;

        let price = positive_price(PROVIDER_ID, value)?;

        Ok(SpotQuote::new(PROVIDER_ID, PriceLane::Retail, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_and_lane() {
        let provider = CommodityPriceApiProvider::new("key".to_string());
        assert_eq!(provider.id(), "commoditypriceapi.com");
        assert_eq!(provider.lane(), PriceLane::Retail);
    }

    #[test]
    fn test_extract_rate_nested_shape() {
        let json = r#"{ "data": { "rates": { "xau": 2416.75 } } }"#;
        let payload: CommodityPriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            CommodityPriceApiProvider::extract_rate(&payload, "xau"),
            Some(2416.75)
        );
    }

    #[test]
    fn test_extract_rate_flat_shape() {
        let json = r#"{ "rates": { "xag": 31.58 } }"#;
        let payload: CommodityPriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            CommodityPriceApiProvider::extract_rate(&payload, "xag"),
            Some(31.58)
        );
    }

    #[test]
    fn test_extract_rate_missing_symbol() {
        let json = r#"{ "rates": { "xau": 2400.0 } }"#;
        let payload: CommodityPriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            CommodityPriceApiProvider::extract_rate(&payload, "xag"),
            None
        );
    }

    #[test]
    fn test_nested_shape_wins_over_flat() {
        let json = r#"{
            "data": { "rates": { "xau": 2401.0 } },
            "rates": { "xau": 1.0 }
        }"#;
        let payload: CommodityPriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            CommodityPriceApiProvider::extract_rate(&payload, "xau"),
            Some(2401.0)
        );
    }
}
