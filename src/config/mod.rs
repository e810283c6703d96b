//! Configuration module
//!
//! Layered configuration: defaults, TOML file, environment variables.

pub mod config;
pub mod loader;

pub use config::AppConfig;
pub use loader::ConfigLoader;
