//! Explicit multi-statement transactions.

use orma_data::{DataError, Dialect, Executor, Row, Value};
use sqlx::{Any, Transaction};
use tokio::sync::Mutex;

use crate::error::SqlxErrorExt;
use crate::row;

/// A transaction on one pooled connection, usable as an [`Executor`].
///
/// Statements run one at a time on the same connection. The transaction ends
/// with [`commit`](Tx::commit) or [`rollback`](Tx::rollback); dropping an
/// unfinished `Tx` (for example when the owning task is cancelled) rolls it
/// back before the connection is reused.
///
/// ```ignore
/// let tx = pool.begin().await?;
/// order.save(&tx).await?;
/// line.save(&tx).await?;
/// tx.commit().await?;
/// ```
pub struct Tx {
    inner: Mutex<Transaction<'static, Any>>,
    dialect: Dialect,
}

impl Tx {
    pub(crate) fn new(tx: Transaction<'static, Any>, dialect: Dialect) -> Self {
        Self {
            inner: Mutex::new(tx),
            dialect,
        }
    }

    pub async fn commit(self) -> Result<(), DataError> {
        self.inner
            .into_inner()
            .commit()
            .await
            .map_err(|e| e.into_data_error("COMMIT"))?;
        tracing::debug!(target: "orma::sql", "transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DataError> {
        self.inner
            .into_inner()
            .rollback()
            .await
            .map_err(|e| e.into_data_error("ROLLBACK"))?;
        tracing::debug!(target: "orma::sql", "transaction rolled back");
        Ok(())
    }

    /// Unwraps the `Tx` into the inner sqlx `Transaction`.
    pub fn into_inner(self) -> Transaction<'static, Any> {
        self.inner.into_inner()
    }
}

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx").field("dialect", &self.dialect).finish_non_exhaustive()
    }
}

impl Executor for Tx {
    async fn run_query(
        &self,
        sql: &str,
        args: &[Value],
        row_limit: Option<usize>,
    ) -> Result<Vec<Row>, DataError> {
        let (native, bound) = self.dialect.prepare(sql, args);
        tracing::info!(target: "orma::sql", sql = %sql, args = ?args, "SQL (tx)");
        let mut tx = self.inner.lock().await;
        let rows = row::fetch_rows(&mut **tx, &native, &bound, row_limit)
            .await
            .map_err(|e| e.into_data_error(sql))?;
        tracing::debug!(target: "orma::sql", rows = rows.len(), "rows returned");
        Ok(rows)
    }

    /// Runs inside the open transaction; `autocommit` has no effect here.
    async fn run_mutation(
        &self,
        sql: &str,
        args: &[Value],
        _autocommit: bool,
    ) -> Result<u64, DataError> {
        let (native, bound) = self.dialect.prepare(sql, args);
        tracing::info!(target: "orma::sql", sql = %sql, args = ?args, "SQL (tx)");
        let mut tx = self.inner.lock().await;
        let affected = row::execute(&mut **tx, &native, &bound)
            .await
            .map_err(|e| e.into_data_error(sql))?;
        tracing::debug!(target: "orma::sql", affected, "statement completed");
        Ok(affected)
    }

    fn autocommit(&self) -> bool {
        false
    }
}
