use orma_data::{DataError, PoolError};

/// Extension trait for converting `sqlx::Error` into the data-layer errors.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Pool failures map to [`PoolError`]; everything else is an
/// execution failure of `sql`, with the driver error kept as its source.
pub trait SqlxErrorExt {
    fn into_pool_error(self) -> PoolError;
    fn into_data_error(self, sql: &str) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_pool_error(self) -> PoolError {
        match self {
            sqlx::Error::PoolTimedOut => PoolError::Timeout,
            sqlx::Error::PoolClosed => PoolError::Closed,
            other => PoolError::connect(other),
        }
    }

    fn into_data_error(self, sql: &str) -> DataError {
        match self {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => self.into_pool_error().into(),
            other => DataError::execution(sql, other),
        }
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type SqlxResult<T> = Result<T, DataError>;
