//! Error types for the spot price crate.
//!
//! [`SpotError`] covers everything that can go wrong inside a single
//! provider adapter. Errors are always caught at the adapter boundary and
//! recorded into the provenance report; they never propagate past the
//! fetch coordinator.

use thiserror::Error;

/// Errors produced by a provider adapter while fetching a spot price.
///
/// Every variant carries the provider id so a failure can be attributed
/// in the provenance report without extra bookkeeping.
#[derive(Error, Debug, Clone)]
pub enum SpotError {
    /// The provider answered with a non-2xx HTTP status.
    #[error("HTTP {status}: {provider}")]
    Http {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The provider answered with an explicit rate-limit status (HTTP 429).
    /// Kept separate from [`SpotError::Http`] so callers can special-case
    /// throttling.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The adapter call exceeded its cancellation timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The response body could not be parsed, or the expected fields
    /// were missing.
    #[error("Malformed payload: {provider} - {message}")]
    MalformedPayload {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The response parsed but the price was non-finite or non-positive.
    #[error("Invalid price: {provider} - {message}")]
    InvalidPrice {
        /// The provider that returned the price
        provider: String,
        /// Description of the invalid value
        message: String,
    },

    /// The request never completed (DNS, connect, TLS, body read).
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The provider being called
        provider: String,
        /// The transport error message
        message: String,
    },
}

impl SpotError {
    /// The provider this error is attributed to.
    pub fn provider(&self) -> &str {
        match self {
            Self::Http { provider, .. }
            | Self::RateLimited { provider }
            | Self::Timeout { provider }
            | Self::MalformedPayload { provider, .. }
            | Self::InvalidPrice { provider, .. }
            | Self::Network { provider, .. } => provider,
        }
    }

    /// Whether this failure was an explicit throttle from the provider.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
