//! # orma-data-sqlx — SQLx backend for the orma data layer
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-backed
//! runtime for orma. It depends on [`orma-data`] for the mapper, models and the
//! [`Executor`](orma_data::Executor) seam, and adds the connection pool, the
//! statement executor, transactions and error bridging needed to talk to a
//! real database through the sqlx `Any` driver.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PoolConfig`] | Connection settings, loadable from the `datasource` config section |
//! | [`ConnectionPool`] | Size-bounded pool with `initialize` / `acquire` / `shutdown` lifecycle |
//! | [`SqlxExecutor`] | [`Executor`](orma_data::Executor) that runs each statement on a pooled connection |
//! | [`Tx`] | Explicit transaction usable as an executor; rolls back when dropped |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` into pool and execution errors |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `mysql`    | MySQL / MariaDB via `sqlx/mysql` (default) |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use orma_data::{FindOptions, Model};
//! use orma_data_sqlx::{ConnectionPool, PoolConfig, SqlxExecutor};
//!
//! let config: PoolConfig = OrmaConfig::load("dev")?.section()?;
//! let pool = Arc::new(ConnectionPool::connect(config).await?);
//! let executor = SqlxExecutor::new(pool.clone());
//!
//! let mut user = users.instance().with("id", 1)?.with("name", "a")?;
//! user.save(&executor).await?;
//! let found = Model::find(&users, &executor, 1).await?;
//!
//! pool.shutdown().await;
//! ```
//!
//! # Statements
//!
//! Generated SQL uses `?` placeholders and backtick-quoted identifiers. The
//! executor rewrites them for the configured backend (see
//! [`Dialect`](orma_data::Dialect)) and logs every statement at `info` under
//! the `orma::sql` target.

pub mod config;
pub mod error;
pub mod executor;
pub mod pool;
mod row;
pub mod tx;

pub use config::{Backend, PoolConfig};
pub use error::{SqlxErrorExt, SqlxResult};
pub use executor::SqlxExecutor;
pub use pool::{ConnectionPool, PoolStatus};
pub use tx::Tx;

/// Re-exports of the most commonly used types from both `orma-data` and this crate.
pub mod prelude {
    pub use crate::{ConnectionPool, PoolConfig, SqlxErrorExt, SqlxExecutor, Tx};
    pub use orma_data::prelude::*;
}
