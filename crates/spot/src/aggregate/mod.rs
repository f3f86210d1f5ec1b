//! Robust aggregation: lane reduction, lane synthesis, and blending.

mod blend;
mod reducer;
mod synthesizer;

pub use blend::{blend, clamp_bias};
pub use reducer::{median, reduce_lane};
pub use synthesizer::fill_missing_lane;
