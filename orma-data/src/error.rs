use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// An entity declaration is invalid. Raised once, at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    MissingPrimaryKey { entity: String },
    DuplicatePrimaryKey { entity: String, attribute: String },
    DuplicateAttribute { entity: String, attribute: String },
    AlreadyRegistered { entity: String },
}

impl std::fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationError::MissingPrimaryKey { entity } => {
                write!(f, "Primary key not found for entity {entity}")
            }
            RegistrationError::DuplicatePrimaryKey { entity, attribute } => {
                write!(f, "Duplicate primary key for field {attribute} of entity {entity}")
            }
            RegistrationError::DuplicateAttribute { entity, attribute } => {
                write!(f, "Attribute {attribute} declared twice on entity {entity}")
            }
            RegistrationError::AlreadyRegistered { entity } => {
                write!(f, "Entity {entity} is already registered")
            }
        }
    }
}

impl StdError for RegistrationError {}

/// The connection pool could not hand out a connection.
#[derive(Debug)]
pub enum PoolError {
    /// No connection was released before the acquire timeout elapsed.
    Timeout,
    /// The pool has been shut down.
    Closed,
    /// A non-waiting acquisition found no idle connection.
    Exhausted,
    /// `initialize` has not been called yet.
    NotInitialized,
    /// `initialize` was called while a pool is live.
    AlreadyInitialized,
    /// Establishing the pool or a connection failed.
    Connect(BoxError),
}

impl PoolError {
    pub fn connect(err: impl StdError + Send + Sync + 'static) -> Self {
        PoolError::Connect(Box::new(err))
    }
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::Timeout => write!(f, "Timed out waiting for a pooled connection"),
            PoolError::Closed => write!(f, "Connection pool is closed"),
            PoolError::Exhausted => write!(f, "Connection pool is exhausted"),
            PoolError::NotInitialized => write!(f, "Connection pool is not initialized"),
            PoolError::AlreadyInitialized => write!(f, "Connection pool is already initialized"),
            PoolError::Connect(err) => write!(f, "Connection error: {err}"),
        }
    }
}

impl StdError for PoolError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PoolError::Connect(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// A driver or network failure while executing a statement.
///
/// The driver error is kept as the [`source`](StdError::source).
#[derive(Debug)]
pub struct ExecutionError {
    sql: String,
    source: BoxError,
}

impl ExecutionError {
    pub fn new(sql: impl Into<String>, err: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            sql: sql.into(),
            source: Box::new(err),
        }
    }

    /// The statement that failed.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Execution of `{}` failed: {}", self.sql, self.source)
    }
}

impl StdError for ExecutionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// The affected-row count of a save/update/remove did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceError {
    pub operation: &'static str,
    pub entity: String,
    pub expected: u64,
    pub affected: u64,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to {} {} record: expected {} affected row(s), got {}",
            self.operation, self.entity, self.expected, self.affected
        )
    }
}

impl StdError for PersistenceError {}

/// Errors that can occur in the data layer.
///
/// Callers can tell an invalid declaration ([`DataError::Registration`]) from
/// invalid data or operations ([`DataError::Persistence`],
/// [`DataError::Execution`], [`DataError::UnknownAttribute`]) from unavailable
/// infrastructure ([`DataError::Pool`]).
#[derive(Debug)]
pub enum DataError {
    Registration(RegistrationError),
    Pool(PoolError),
    Execution(ExecutionError),
    Persistence(PersistenceError),
    UnknownAttribute { entity: String, attribute: String },
    Decode(String),
}

impl DataError {
    /// Wrap a driver error raised while running `sql`.
    pub fn execution(sql: impl Into<String>, err: impl StdError + Send + Sync + 'static) -> Self {
        DataError::Execution(ExecutionError::new(sql, err))
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, DataError::Registration(_))
    }

    pub fn is_pool(&self) -> bool {
        matches!(self, DataError::Pool(_))
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, DataError::Execution(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, DataError::Persistence(_))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Registration(err) => write!(f, "Registration error: {err}"),
            DataError::Pool(err) => write!(f, "Pool error: {err}"),
            DataError::Execution(err) => write!(f, "{err}"),
            DataError::Persistence(err) => write!(f, "{err}"),
            DataError::UnknownAttribute { entity, attribute } => {
                write!(f, "{entity} has no attribute {attribute}")
            }
            DataError::Decode(msg) => write!(f, "Decode error: {msg}"),
        }
    }
}

impl StdError for DataError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DataError::Pool(err) => err.source(),
            DataError::Execution(err) => err.source(),
            _ => None,
        }
    }
}

impl From<RegistrationError> for DataError {
    fn from(err: RegistrationError) -> Self {
        DataError::Registration(err)
    }
}

impl From<PoolError> for DataError {
    fn from(err: PoolError) -> Self {
        DataError::Pool(err)
    }
}

impl From<ExecutionError> for DataError {
    fn from(err: ExecutionError) -> Self {
        DataError::Execution(err)
    }
}

impl From<PersistenceError> for DataError {
    fn from(err: PersistenceError) -> Self {
        DataError::Persistence(err)
    }
}
