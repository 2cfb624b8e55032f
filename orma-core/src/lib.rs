//! Ambient runtime for orma: layered configuration and tracing setup.

pub mod config;
pub mod tracing_setup;

pub use config::{
    ConfigError, ConfigProperties, ConfigValidationDetail, ConfigValue, FromConfigValue,
    OrmaConfig,
};
pub use tracing_setup::{init_tracing, LogFormat};
