use orma_core::config::{ConfigError, ConfigProperties, ConfigValidationDetail, ConfigValue, OrmaConfig};
use orma_core::LogFormat;

#[test]
fn test_empty_config() {
    let config = OrmaConfig::empty();
    assert!(config.get::<String>("nonexistent").is_err());
    assert_eq!(config.profile(), "test");
}

#[test]
fn test_set_and_get() {
    let mut config = OrmaConfig::empty();
    config.set("datasource.host", ConfigValue::String("db.internal".into()));
    assert_eq!(config.get::<String>("datasource.host").unwrap(), "db.internal");
}

#[test]
fn test_get_or_default() {
    let config = OrmaConfig::empty();
    assert_eq!(config.get_or("missing", 42i64).unwrap(), 42);
}

#[test]
fn test_env_style_key_overrides_dashed_key() {
    let mut config = OrmaConfig::from_yaml_str("datasource:\n  max-size: 10\n", "test").unwrap();
    assert_eq!(config.get::<u32>("datasource.max-size").unwrap(), 10);
    config.set("datasource.max.size", ConfigValue::String("4".into()));
    assert_eq!(config.get::<u32>("datasource.max-size").unwrap(), 4);
    assert!(config.contains_key("datasource.max-size"));
}

#[test]
fn test_get_or_keeps_type_errors() {
    let mut config = OrmaConfig::empty();
    config.set("datasource.port", ConfigValue::String("not-a-port".into()));
    let err = config.get_or("datasource.port", 3306u16).unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { expected: "i64", .. }));
}

#[test]
fn test_type_conversions() {
    let mut config = OrmaConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(2.5));
    config.set("bool_val", ConfigValue::Bool(true));
    config.set("bool_str", ConfigValue::String("no".into()));
    config.set("null_val", ConfigValue::Null);

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<u32>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 2.5);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert!(!config.get::<bool>("bool_str").unwrap());
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
}

#[test]
fn test_integer_range_check() {
    let mut config = OrmaConfig::empty();
    config.set("datasource.port", ConfigValue::Integer(70_000));
    let err = config.get::<u16>("datasource.port").unwrap_err();
    assert!(matches!(err, ConfigError::TypeMismatch { expected: "u16", .. }));
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
datasource:
  host: "localhost"
  port: 3306
  autocommit: false
  pool:
    sizes: [1, 10]
"#;
    let config = OrmaConfig::from_yaml_str(yaml, "test").unwrap();

    assert_eq!(config.get::<String>("datasource.host").unwrap(), "localhost");
    assert_eq!(config.get::<u16>("datasource.port").unwrap(), 3306);
    assert!(!config.get::<bool>("datasource.autocommit").unwrap());
    assert_eq!(config.get::<Vec<u32>>("datasource.pool.sizes").unwrap(), vec![1, 10]);
    assert!(!config.contains_key("datasource"));
}

#[test]
fn test_invalid_yaml_is_load_error() {
    let err = OrmaConfig::from_yaml_str("datasource: [unclosed", "test").unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn test_load_from_directory_with_profile_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "datasource:\n  host: base-host\n  max-size: 10\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("application-staging.yaml"),
        "datasource:\n  host: staging-host\n",
    )
    .unwrap();

    let config = OrmaConfig::load_from(dir.path(), "staging").unwrap();
    assert_eq!(config.get::<String>("datasource.host").unwrap(), "staging-host");
    assert_eq!(config.get::<u32>("datasource.max-size").unwrap(), 10);
}

struct Limits {
    max: u32,
}

impl ConfigProperties for Limits {
    fn prefix() -> &'static str {
        "limits"
    }

    fn from_config(config: &OrmaConfig) -> Result<Self, ConfigError> {
        let max = config.get_or(&Self::key("max"), 5u32)?;
        if max == 0 {
            return Err(ConfigError::Validation(vec![ConfigValidationDetail::new(
                Self::key("max"),
                "must be at least 1",
            )]));
        }
        Ok(Limits { max })
    }
}

#[test]
fn test_typed_section() {
    let config = OrmaConfig::from_yaml_str("limits:\n  max: 7\n", "test").unwrap();
    let limits: Limits = config.section().unwrap();
    assert_eq!(limits.max, 7);

    let defaults: Limits = OrmaConfig::empty().section().unwrap();
    assert_eq!(defaults.max, 5);
}

#[test]
fn test_typed_section_validation_message() {
    let config = OrmaConfig::from_yaml_str("limits:\n  max: 0\n", "test").unwrap();
    let err = config.section::<Limits>().err().unwrap();
    assert_eq!(
        err.to_string(),
        "Config validation errors:\n  - limits.max: must be at least 1"
    );
}

#[test]
fn test_log_format_from_config() {
    let config = OrmaConfig::from_yaml_str("logging:\n  format: JSON\n", "test").unwrap();
    assert_eq!(LogFormat::from_config(&config), LogFormat::Json);
    assert_eq!(LogFormat::from_config(&OrmaConfig::empty()), LogFormat::Pretty);
}
