//! goldapi.io provider for precious metals reference prices.
//!
//! Endpoint: `https://www.goldapi.io/api/{XAU|XAG}/USD` with an
//! `x-access-token` header. The response carries the USD-per-troy-ounce
//! price directly. Classified as a retail/reference feed.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::SpotError;
use crate::models::{MetalCode, PriceLane, SpotQuote};
use crate::provider::{positive_price, SpotPriceProvider};

const BASE_URL: &str = "https://www.goldapi.io/api";
const PROVIDER_ID: &str = "goldapi.io";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API response from goldapi.io
#[derive(Debug, Deserialize)]
struct GoldApiIoResponse {
    /// USD per troy ounce
    price: f64,
}

/// goldapi.io spot price provider (retail lane, header-token auth).
pub struct GoldApiIoProvider {
    client: Client,
    api_key: String,
}

impl GoldApiIoProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }
}

#[async_trait]
impl SpotPriceProvider for GoldApiIoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn lane(&self) -> PriceLane {
        PriceLane::Retail
    }

    async fn fetch_spot(&self, metal: MetalCode) -> Result<SpotQuote, SpotError> {
        let url = format!("{}/{}/USD", BASE_URL, metal);

        let response = self
            .client
            .get(&url)
            .header("x-access-token", &self.api_key)
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

        let payload: GoldApiIoResponse =
            response
                .json()
                .await
                .map_err(|e| SpotError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        let price = positive_price(PROVIDER_ID, payload.price)?;

        Ok(SpotQuote::new(PROVIDER_ID, PriceLane::Retail, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_and_lane() {
        let provider = GoldApiIoProvider::new("token".to_string());
        assert_eq!(provider.id(), "goldapi.io");
        assert_eq!(provider.lane(), PriceLane::Retail);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "metal": "XAU",
            "currency": "USD",
            "price": 2418.90,
            "prev_close_price": 2404.15
        }"#;
        let payload: GoldApiIoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.price, 2418.90);
    }
}
