use std::sync::Arc;

use orma_data::{DataError, Executor, Row, Value};

use crate::error::SqlxErrorExt;
use crate::pool::ConnectionPool;
use crate::row;

/// Runs statements on connections checked out from a [`ConnectionPool`].
///
/// Each statement acquires its own connection and releases it on every exit
/// path. Non-autocommit mutations run in a transaction of their own.
#[derive(Debug, Clone)]
pub struct SqlxExecutor {
    pool: Arc<ConnectionPool>,
    autocommit: Option<bool>,
}

impl SqlxExecutor {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            pool,
            autocommit: None,
        }
    }

    /// Override the pool's configured autocommit mode for model mutations.
    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = Some(autocommit);
        self
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }
}

impl Executor for SqlxExecutor {
    async fn run_query(
        &self,
        sql: &str,
        args: &[Value],
        row_limit: Option<usize>,
    ) -> Result<Vec<Row>, DataError> {
        let live = self.pool.live().await?;
        let (native, bound) = live.dialect.prepare(sql, args);
        tracing::info!(target: "orma::sql", sql = %sql, args = ?args, "SQL");

        let mut conn = live
            .pool
            .acquire()
            .await
            .map_err(|e| e.into_data_error(sql))?;
        let rows = row::fetch_rows(&mut conn, &native, &bound, row_limit)
            .await
            .map_err(|e| e.into_data_error(sql))?;
        tracing::debug!(target: "orma::sql", rows = rows.len(), "rows returned");
        Ok(rows)
    }

    async fn run_mutation(
        &self,
        sql: &str,
        args: &[Value],
        autocommit: bool,
    ) -> Result<u64, DataError> {
        let live = self.pool.live().await?;
        let (native, bound) = live.dialect.prepare(sql, args);
        tracing::info!(target: "orma::sql", sql = %sql, args = ?args, autocommit, "SQL");

        let affected = if autocommit {
            let mut conn = live
                .pool
                .acquire()
                .await
                .map_err(|e| e.into_data_error(sql))?;
            row::execute(&mut conn, &native, &bound)
                .await
                .map_err(|e| e.into_data_error(sql))?
        } else {
            let mut tx = live
                .pool
                .begin()
                .await
                .map_err(|e| e.into_data_error(sql))?;
            match row::execute(&mut tx, &native, &bound).await {
                Ok(affected) => {
                    // A failed commit drops `tx`, which rolls back.
                    tx.commit().await.map_err(|e| e.into_data_error(sql))?;
                    affected
                }
                Err(err) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(
                            target: "orma::sql",
                            error = %rollback_err,
                            "rollback after failed statement also failed"
                        );
                    }
                    return Err(err.into_data_error(sql));
                }
            }
        };
        tracing::debug!(target: "orma::sql", affected, "statement completed");
        Ok(affected)
    }

    fn autocommit(&self) -> bool {
        self.autocommit.unwrap_or_else(|| self.pool.autocommit())
    }
}
