//! Core data types for spot price aggregation.

mod quote;
mod types;

pub use quote::{BlendedQuote, LaneAggregate, ProviderFailure, ProviderOutcome, SpotQuote};
pub use types::{MetalCode, PriceLane, UnknownMetalCode};
