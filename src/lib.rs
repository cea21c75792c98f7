pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::app::GatewayApp;
pub use crate::config::{CliArgs, GatewayConfig};
pub use crate::core::forwarder::{Delivery, EngineForwarder};
pub use crate::utils::error::{GatewayError, Result};
