//! HTTP API: the order and product services, their routing and wiring.

pub mod app;
pub mod config;
pub mod middleware;

pub use config::{AppConfig, ConfigError};
