//! Bullionfolio Spot Price Crate
//!
//! Aggregates precious-metals spot prices (USD per troy ounce) from
//! several independently-failing feeds into one trustworthy answer.
//!
//! # Overview
//!
//! No single free or paid price feed is reliable enough on its own: they
//! rate-limit, go down, and disagree about whether they quote wholesale
//! "market" or consumer "retail" prices. This crate fans out to every
//! enabled feed concurrently, reduces each semantic lane to a median that
//! shrugs off a single skewed feed, synthesizes a missing lane from the
//! other when needed, and blends the two lanes with a caller-chosen
//! weight — all behind a short-TTL cache that keeps the feeds happy.
//!
//! # Architecture
//!
//! ```text
//! +--------------+   +--------------+   +--------------+
//! |   Adapter    |   |   Adapter    |   |   Adapter    |   (one per feed,
//! +--------------+   +--------------+   +--------------+    market or retail)
//!        \                  |                  /
//!         v                 v                 v
//!               +------------------------+
//!               |   Fetch Coordinator    |  (parallel, settle-all)
//!               +------------------------+
//!                    |               |
//!                    v               v
//!            +--------------+ +--------------+
//!            | Lane Reducer | | Lane Reducer |  (median + outlier band)
//!            +--------------+ +--------------+
//!                    \               /
//!                     v             v
//!               +------------------------+
//!               | Synthesizer  +  Blend  |  (spread fill-in, bias weight)
//!               +------------------------+
//!                           |
//!                           v
//!               +------------------------+
//!               |      BlendedQuote      |  (+ provenance, cached)
//!               +------------------------+
//! ```
//!
//! # Core Types
//!
//! - [`SpotEngine`] - The facade orchestrating the whole pipeline
//! - [`SpotPriceProvider`] - Trait each feed adapter implements
//! - [`BlendedQuote`] - Per-lane values, blended price, provenance
//! - [`MetalCode`] / [`PriceLane`] - The two request axes
//! - [`SpotCache`] - Swappable get/put store for blended quotes

pub mod aggregate;
pub mod cache;
pub mod coordinator;
pub mod engine;
pub mod errors;
pub mod models;
pub mod provider;

// Re-export all public types from models
pub use models::{
    BlendedQuote, LaneAggregate, MetalCode, PriceLane, ProviderFailure, ProviderOutcome,
    SpotQuote, UnknownMetalCode,
};

// Re-export provider types
pub use provider::commodity_price_api::CommodityPriceApiProvider;
pub use provider::gold_api::GoldApiProvider;
pub use provider::goldapi_io::GoldApiIoProvider;
pub use provider::metal_price_api::MetalPriceApiProvider;
pub use provider::metals_api::MetalsApiProvider;
pub use provider::metals_dev::MetalsDevProvider;
pub use provider::SpotPriceProvider;

// Re-export engine and cache types
pub use cache::{InMemorySpotCache, SpotCache, DEFAULT_TTL};
pub use engine::{EngineConfig, SpotEngine};
pub use errors::SpotError;
