use super::{ConfigError, OrmaConfig};

/// Trait for strongly-typed configuration sections.
///
/// ```ignore
/// impl ConfigProperties for PoolConfig {
///     fn prefix() -> &'static str { "datasource" }
///     fn from_config(config: &OrmaConfig) -> Result<Self, ConfigError> { ... }
/// }
///
/// let pool: PoolConfig = OrmaConfig::load("dev")?.section()?;
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"datasource"`).
    fn prefix() -> &'static str;

    /// Construct from an `OrmaConfig` instance.
    fn from_config(config: &OrmaConfig) -> Result<Self, ConfigError>;

    /// Absolute key for a property of this section.
    fn key(property: &str) -> String {
        format!("{}.{property}", Self::prefix())
    }
}
