//! Environment-driven server configuration.
//!
//! Provider credentials double as enable flags: an adapter is assembled
//! only when its key is present and non-empty. gold-api.com needs no key
//! and is always on.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use bullionfolio_spot::aggregate::clamp_bias;

/// Runtime configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Socket address to bind, e.g. "0.0.0.0:8787"
    pub listen_addr: String,

    /// Directory of the PWA assets served next to the API
    pub static_dir: String,

    /// Lifetime of a cached blended quote
    pub cache_ttl: Duration,

    /// Outlier band for gold, fraction of the lane median
    pub outlier_band_gold: Decimal,

    /// Outlier band for silver
    pub outlier_band_silver: Decimal,

    /// Assumed retail markup used to synthesize a missing lane
    pub synthetic_spread: Decimal,

    /// Blend weight when the request carries no `bias` parameter
    pub default_bias_percent: u8,

    /// Cancellation timeout per provider call
    pub provider_timeout: Duration,

    // Provider keys (optional; presence enables the adapter)
    pub metalpriceapi_key: Option<String>,
    pub metals_api_key: Option<String>,
    pub goldapi_io_key: Option<String>,
    pub metals_dev_key: Option<String>,
    pub commoditypriceapi_key: Option<String>,
}

/// A trimmed, non-empty environment string.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment value, falling back on absence or garbage.
fn env_parsed<T: FromStr>(key: &str, fallback: T) -> T {
    env_string(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = env_parsed("PORT", 8787);

        Self {
            listen_addr: env_string("LISTEN_ADDR")
                .unwrap_or_else(|| format!("0.0.0.0:{}", port)),
            static_dir: env_string("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            cache_ttl: Duration::from_secs(env_parsed("CACHE_TTL_SECS", 60)),
            outlier_band_gold: env_parsed("OUTLIER_BAND_GOLD", Decimal::new(1, 2)),
            outlier_band_silver: env_parsed("OUTLIER_BAND_SILVER", Decimal::new(2, 2)),
            synthetic_spread: env_parsed("SYNTHETIC_SPREAD", Decimal::new(2, 2)),
            default_bias_percent: clamp_bias(env_parsed("DEFAULT_BIAS_PERCENT", 0i64)),
            provider_timeout: Duration::from_secs(env_parsed("PROVIDER_TIMEOUT_SECS", 5)),
            metalpriceapi_key: env_string("METALPRICEAPI_KEY"),
            metals_api_key: env_string("METALS_API_KEY"),
            goldapi_io_key: env_string("GOLDAPI_IO_KEY"),
            metals_dev_key: env_string("METALS_DEV_KEY"),
            commoditypriceapi_key: env_string("COMMODITYPRICEAPI_KEY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test touches only its own variable names; tests in this binary
    // run in parallel and the environment is process-global.

    #[test]
    fn test_defaults_without_environment() {
        std::env::remove_var("CACHE_TTL_SECS");
        std::env::remove_var("OUTLIER_BAND_GOLD");
        std::env::remove_var("OUTLIER_BAND_SILVER");
        let config = Config::from_env();

        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.outlier_band_gold, Decimal::new(1, 2));
        assert_eq!(config.outlier_band_silver, Decimal::new(2, 2));
    }

    #[test]
    fn test_blank_key_does_not_enable_a_provider() {
        std::env::set_var("GOLDAPI_IO_KEY", "   ");
        let config = Config::from_env();
        assert!(config.goldapi_io_key.is_none());
        std::env::remove_var("GOLDAPI_IO_KEY");
    }

    #[test]
    fn test_garbage_numeric_falls_back() {
        std::env::set_var("PROVIDER_TIMEOUT_SECS", "soon");
        let config = Config::from_env();
        assert_eq!(config.provider_timeout, Duration::from_secs(5));
        std::env::remove_var("PROVIDER_TIMEOUT_SECS");
    }

    #[test]
    fn test_bias_from_env_is_clamped() {
        std::env::set_var("DEFAULT_BIAS_PERCENT", "250");
        let config = Config::from_env();
        assert_eq!(config.default_bias_percent, 100);
        std::env::remove_var("DEFAULT_BIAS_PERCENT");
    }
}
