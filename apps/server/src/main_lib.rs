use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use bullionfolio_spot::{
    CommodityPriceApiProvider, EngineConfig, GoldApiIoProvider, GoldApiProvider,
    InMemorySpotCache, MetalPriceApiProvider, MetalsApiProvider, MetalsDevProvider, SpotEngine,
    SpotPriceProvider,
};

use crate::config::Config;

pub struct AppState {
    pub spot_engine: Arc<SpotEngine>,
}

pub fn init_tracing() {
    let log_format = std::env::var("BF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Assemble the enabled providers from configuration.
///
/// gold-api.com is keyless and always on; every other adapter exists only
/// when its credential does.
fn build_providers(config: &Config) -> Vec<Arc<dyn SpotPriceProvider>> {
    let mut providers: Vec<Arc<dyn SpotPriceProvider>> =
        vec![Arc::new(GoldApiProvider::new())];

    if let Some(key) = &config.metalpriceapi_key {
        providers.push(Arc::new(MetalPriceApiProvider::new(key.clone())));
    }
    if let Some(key) = &config.metals_api_key {
        providers.push(Arc::new(MetalsApiProvider::new(key.clone())));
    }
    if let Some(key) = &config.goldapi_io_key {
        providers.push(Arc::new(GoldApiIoProvider::new(key.clone())));
    }
    if let Some(key) = &config.metals_dev_key {
        providers.push(Arc::new(MetalsDevProvider::new(key.clone())));
    }
    if let Some(key) = &config.commoditypriceapi_key {
        providers.push(Arc::new(CommodityPriceApiProvider::new(key.clone())));
    }

    providers
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    let providers = build_providers(config);
    tracing::info!(
        "spot providers enabled: {}",
        providers
            .iter()
            .map(|p| p.id())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let cache = Arc::new(InMemorySpotCache::new(config.cache_ttl));
    let engine_config = EngineConfig {
        outlier_band_gold: config.outlier_band_gold,
        outlier_band_silver: config.outlier_band_silver,
        synthetic_spread: config.synthetic_spread,
        default_bias_percent: config.default_bias_percent,
        provider_timeout: config.provider_timeout,
    };

    let spot_engine = Arc::new(SpotEngine::new(providers, cache, engine_config));

    Arc::new(AppState { spot_engine })
}
