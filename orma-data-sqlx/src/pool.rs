use std::sync::atomic::{AtomicBool, Ordering};

use orma_data::{Dialect, PoolError};
use sqlx::any::AnyPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyPool};
use tokio::sync::RwLock;

use crate::config::PoolConfig;
use crate::error::SqlxErrorExt;
use crate::tx::Tx;

/// Counters of a [`ConnectionPool`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatus {
    /// Open connections, idle or checked out.
    pub size: u32,
    pub idle: u32,
    pub checked_out: u32,
    pub max_size: u32,
    pub closed: bool,
}

#[derive(Debug)]
enum PoolState {
    Uninitialized,
    Live(Live),
    Closed,
}

/// Handle to a live sqlx pool. Cloning is cheap.
#[derive(Debug, Clone)]
pub(crate) struct Live {
    pub(crate) pool: AnyPool,
    pub(crate) dialect: Dialect,
    pub(crate) max_size: u32,
}

/// Size-bounded pool of database connections with an explicit lifecycle.
///
/// `Uninitialized -> Live -> Closed`; a closed pool can be initialized again.
/// Share it as `Arc<ConnectionPool>` between executors.
#[derive(Debug)]
pub struct ConnectionPool {
    state: RwLock<PoolState>,
    autocommit: AtomicBool,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPool {
    /// An uninitialized pool. Acquisition fails until [`initialize`](Self::initialize).
    pub fn new() -> Self {
        Self {
            state: RwLock::new(PoolState::Uninitialized),
            autocommit: AtomicBool::new(true),
        }
    }

    /// Create and initialize a pool in one step.
    pub async fn connect(config: PoolConfig) -> Result<Self, PoolError> {
        let pool = Self::new();
        pool.initialize(config).await?;
        Ok(pool)
    }

    /// Open the pool with `config`.
    ///
    /// Fails with [`PoolError::AlreadyInitialized`] while the pool is live.
    pub async fn initialize(&self, config: PoolConfig) -> Result<(), PoolError> {
        let mut state = self.state.write().await;
        if matches!(*state, PoolState::Live(_)) {
            return Err(PoolError::AlreadyInitialized);
        }
        config.validate().map_err(PoolError::connect)?;
        let url = config.connect_url().map_err(PoolError::connect)?;

        tracing::info!(
            backend = %config.backend,
            host = %config.host,
            database = %config.database,
            min_size = config.min_size,
            max_size = config.max_size,
            "create database connection pool..."
        );
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .min_connections(config.min_size)
            .max_connections(config.max_size)
            .acquire_timeout(config.acquire_timeout)
            .connect(&url)
            .await
            .map_err(SqlxErrorExt::into_pool_error)?;

        self.autocommit.store(config.autocommit, Ordering::Release);
        *state = PoolState::Live(Live {
            pool,
            dialect: config.dialect(),
            max_size: config.max_size,
        });
        Ok(())
    }

    pub(crate) async fn live(&self) -> Result<Live, PoolError> {
        match &*self.state.read().await {
            PoolState::Live(live) => Ok(live.clone()),
            PoolState::Uninitialized => Err(PoolError::NotInitialized),
            PoolState::Closed => Err(PoolError::Closed),
        }
    }

    /// Check out a connection, waiting up to the acquire timeout.
    ///
    /// The connection returns to the pool when dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Any>, PoolError> {
        let live = self.live().await?;
        live.pool
            .acquire()
            .await
            .map_err(SqlxErrorExt::into_pool_error)
    }

    /// Check out an idle connection without waiting.
    pub async fn try_acquire(&self) -> Result<PoolConnection<Any>, PoolError> {
        let live = self.live().await?;
        if live.pool.is_closed() {
            return Err(PoolError::Closed);
        }
        live.pool.try_acquire().ok_or(PoolError::Exhausted)
    }

    /// Check out a connection and begin a transaction on it.
    pub async fn begin(&self) -> Result<Tx, PoolError> {
        let live = self.live().await?;
        let tx = live
            .pool
            .begin()
            .await
            .map_err(SqlxErrorExt::into_pool_error)?;
        Ok(Tx::new(tx, live.dialect))
    }

    /// Close every connection. Later acquisitions fail with [`PoolError::Closed`].
    ///
    /// Waits for checked-out connections to come back.
    pub async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.write().await, PoolState::Closed);
        if let PoolState::Live(live) = previous {
            tracing::info!("close database connection pool...");
            live.pool.close().await;
        }
    }

    /// Autocommit mode configured for mutations.
    pub fn autocommit(&self) -> bool {
        self.autocommit.load(Ordering::Acquire)
    }

    pub async fn is_live(&self) -> bool {
        matches!(*self.state.read().await, PoolState::Live(_))
    }

    pub async fn status(&self) -> PoolStatus {
        match &*self.state.read().await {
            PoolState::Live(live) => {
                let size = live.pool.size();
                let idle = u32::try_from(live.pool.num_idle()).unwrap_or(size);
                PoolStatus {
                    size,
                    idle,
                    checked_out: size.saturating_sub(idle),
                    max_size: live.max_size,
                    closed: live.pool.is_closed(),
                }
            }
            PoolState::Uninitialized => PoolStatus::default(),
            PoolState::Closed => PoolStatus {
                closed: true,
                ..PoolStatus::default()
            },
        }
    }
}
