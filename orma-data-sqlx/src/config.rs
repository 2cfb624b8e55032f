use std::time::Duration;

use orma_core::{ConfigError, ConfigProperties, ConfigValidationDetail, OrmaConfig};
use orma_data::Dialect;

/// Database server the pool connects to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    MySql,
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn dialect(self) -> Dialect {
        match self {
            Backend::MySql => Dialect::MySql,
            Backend::Postgres => Dialect::Postgres,
            Backend::Sqlite => Dialect::Sqlite,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Backend::MySql => 3306,
            Backend::Postgres => 5432,
            Backend::Sqlite => 0,
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            Backend::MySql => "mysql",
            Backend::Postgres => "postgres",
            Backend::Sqlite => "sqlite",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Backend::MySql),
            "postgres" | "postgresql" => Some(Backend::Postgres),
            "sqlite" => Some(Backend::Sqlite),
            _ => None,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Connection settings of a [`ConnectionPool`](crate::ConnectionPool).
///
/// Loaded from the `datasource` section:
///
/// ```yaml
/// datasource:
///   backend: mysql
///   host: localhost
///   port: 3306
///   user: www-data
///   password: www-data
///   database: awesome
///   charset: utf8mb4
///   autocommit: true
///   min-size: 1
///   max-size: 10
///   acquire-timeout-ms: 30000
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Database name, or the file path (`:memory:` allowed) for SQLite.
    pub database: String,
    pub charset: String,
    /// Default mode of mutations run through the pool's executors.
    pub autocommit: bool,
    pub min_size: u32,
    pub max_size: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            backend: Backend::MySql,
            host: "localhost".into(),
            port: Backend::MySql.default_port(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
            charset: "utf8mb4".into(),
            autocommit: true,
            min_size: 1,
            max_size: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolConfig {
    pub fn mysql(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn postgres(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            backend: Backend::Postgres,
            port: Backend::Postgres.default_port(),
            ..Self::mysql(user, password, database)
        }
    }

    /// A SQLite database file, created when missing.
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: Backend::Sqlite,
            port: Backend::Sqlite.default_port(),
            database: path.into(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    pub fn min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    /// Check pool bounds and the charset identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        if self.max_size < 1 {
            errors.push(ConfigValidationDetail::new(
                Self::key("max-size"),
                "must be at least 1",
            ));
        }
        if self.min_size > self.max_size {
            errors.push(ConfigValidationDetail::new(
                Self::key("min-size"),
                format!("must not exceed max-size ({})", self.max_size),
            ));
        }
        if self.backend == Backend::MySql && !is_charset_identifier(&self.charset) {
            let hint = if self.charset.eq_ignore_ascii_case("utf-8") {
                ", use utf8mb4"
            } else {
                ""
            };
            errors.push(ConfigValidationDetail::new(
                Self::key("charset"),
                format!("'{}' is not a driver charset name{hint}", self.charset),
            ));
        }
        if self.database.trim().is_empty() {
            errors.push(ConfigValidationDetail::new(
                Self::key("database"),
                "must not be empty",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Connection URL understood by the sqlx `Any` driver.
    pub fn connect_url(&self) -> Result<String, ConfigError> {
        if self.backend == Backend::Sqlite {
            return Ok(if self.database == ":memory:" {
                "sqlite::memory:".to_string()
            } else {
                format!("sqlite://{}?mode=rwc", self.database)
            });
        }

        let invalid = |property: &str, message: &str| {
            ConfigError::Validation(vec![ConfigValidationDetail::new(Self::key(property), message)])
        };
        let mut url = url::Url::parse(&format!("{}://{}", self.backend.scheme(), self.host))
            .map_err(|e| invalid("host", &e.to_string()))?;
        url.set_username(&self.user)
            .map_err(|()| invalid("user", "cannot be set on this url"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|()| invalid("password", "cannot be set on this url"))?;
        }
        url.set_port(Some(self.port))
            .map_err(|()| invalid("port", "cannot be set on this url"))?;
        url.set_path(&self.database);
        if self.backend == Backend::MySql {
            url.query_pairs_mut().append_pair("charset", &self.charset);
        }
        Ok(url.into())
    }
}

fn is_charset_identifier(charset: &str) -> bool {
    !charset.is_empty()
        && charset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ConfigProperties for PoolConfig {
    fn prefix() -> &'static str {
        "datasource"
    }

    fn from_config(config: &OrmaConfig) -> Result<Self, ConfigError> {
        let defaults = PoolConfig::default();
        let backend_name: String = config.get_or(&Self::key("backend"), defaults.backend.to_string())?;
        let backend = Backend::parse(&backend_name).ok_or_else(|| {
            ConfigError::Validation(vec![ConfigValidationDetail::new(
                Self::key("backend"),
                format!("unsupported backend '{backend_name}'"),
            )])
        })?;

        let (user, password) = if backend == Backend::Sqlite {
            (
                config.get_or(&Self::key("user"), String::new())?,
                config.get_or(&Self::key("password"), String::new())?,
            )
        } else {
            (
                config.get(&Self::key("user"))?,
                config.get(&Self::key("password"))?,
            )
        };

        let timeout_ms: u64 = config.get_or(
            &Self::key("acquire-timeout-ms"),
            defaults.acquire_timeout.as_millis() as u64,
        )?;

        let pool = PoolConfig {
            backend,
            host: config.get_or(&Self::key("host"), defaults.host)?,
            port: config.get_or(&Self::key("port"), backend.default_port())?,
            user,
            password,
            database: config.get(&Self::key("database"))?,
            charset: config.get_or(&Self::key("charset"), defaults.charset)?,
            autocommit: config.get_or(&Self::key("autocommit"), defaults.autocommit)?,
            min_size: config.get_or(&Self::key("min-size"), defaults.min_size)?,
            max_size: config.get_or(&Self::key("max-size"), defaults.max_size)?,
            acquire_timeout: Duration::from_millis(timeout_ms),
        };
        pool.validate()?;
        Ok(pool)
    }
}
