use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use bullionfolio_spot::aggregate::clamp_bias;
use bullionfolio_spot::{BlendedQuote, MetalCode, ProviderOutcome};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(serde::Deserialize)]
struct SpotQuery {
    metal: Option<String>,
    /// Optional blend weight override; any integer is accepted and clamped
    bias: Option<i64>,
}

/// Wire shape of a spot answer.
///
/// `priceUsdPerTroyOunce` duplicates the blended main price for backward
/// compatibility; consumers that want a different weighting read the two
/// lane fields and re-blend locally.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotResponse {
    metal: MetalCode,
    price_usd_per_troy_ounce: Option<Decimal>,
    market_price_usd_per_troy_ounce: Option<Decimal>,
    retail_price_usd_per_troy_ounce: Option<Decimal>,
    bias_percent: u8,
    used_count: u32,
    fetched_ok_count: u32,
    updated_at_utc_iso: DateTime<Utc>,
    providers: Vec<ProviderOutcome>,
}

impl From<BlendedQuote> for SpotResponse {
    fn from(quote: BlendedQuote) -> Self {
        Self {
            metal: quote.metal,
            price_usd_per_troy_ounce: quote.main_price,
            market_price_usd_per_troy_ounce: quote.market_price,
            retail_price_usd_per_troy_ounce: quote.retail_price,
            bias_percent: quote.bias_percent,
            used_count: quote.used_count,
            fetched_ok_count: quote.fetched_ok_count,
            updated_at_utc_iso: quote.updated_at,
            providers: quote.providers,
        }
    }
}

async fn get_spot(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SpotQuery>,
) -> ApiResult<Json<SpotResponse>> {
    let raw = q.metal.unwrap_or_default().trim().to_uppercase();
    let metal: MetalCode = raw.parse().map_err(|_| {
        ApiError::bad_request("Invalid or missing 'metal' query parameter. Use XAU or XAG.")
    })?;

    let bias = q.bias.map(clamp_bias);
    let quote = state.spot_engine.spot_price(metal, bias).await;

    Ok(Json(quote.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/spot", get(get_spot))
}
