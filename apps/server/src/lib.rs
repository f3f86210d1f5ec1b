//! Bullionfolio server library.
//!
//! Exposes the router, configuration and state assembly so integration
//! tests can drive the HTTP surface without binding a socket.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;

pub use config::Config;
pub use main_lib::{build_state, AppState};
