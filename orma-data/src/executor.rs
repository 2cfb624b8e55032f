use std::future::Future;

use crate::error::DataError;
use crate::row::Row;
use crate::value::Value;

/// Runs SQL statements against a live database.
///
/// Statements use `?` placeholders; implementations translate them for their
/// backend. Uses RPITIT (return-position `impl Trait` in traits) so no
/// `async-trait` is needed.
pub trait Executor: Send + Sync {
    /// Run a read-only statement and return at most `row_limit` rows
    /// (all rows when `None`). No transaction is opened.
    fn run_query(
        &self,
        sql: &str,
        args: &[Value],
        row_limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send;

    /// Run a data-modifying statement and return the affected-row count.
    ///
    /// Without `autocommit` the statement runs in its own transaction that is
    /// rolled back when execution fails.
    fn run_mutation(
        &self,
        sql: &str,
        args: &[Value],
        autocommit: bool,
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Autocommit mode used by model mutations.
    fn autocommit(&self) -> bool {
        true
    }
}

impl<E: Executor> Executor for &E {
    fn run_query(
        &self,
        sql: &str,
        args: &[Value],
        row_limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send {
        (**self).run_query(sql, args, row_limit)
    }

    fn run_mutation(
        &self,
        sql: &str,
        args: &[Value],
        autocommit: bool,
    ) -> impl Future<Output = Result<u64, DataError>> + Send {
        (**self).run_mutation(sql, args, autocommit)
    }

    fn autocommit(&self) -> bool {
        (**self).autocommit()
    }
}

impl<E: Executor> Executor for std::sync::Arc<E> {
    fn run_query(
        &self,
        sql: &str,
        args: &[Value],
        row_limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Row>, DataError>> + Send {
        (**self).run_query(sql, args, row_limit)
    }

    fn run_mutation(
        &self,
        sql: &str,
        args: &[Value],
        autocommit: bool,
    ) -> impl Future<Output = Result<u64, DataError>> + Send {
        (**self).run_mutation(sql, args, autocommit)
    }

    fn autocommit(&self) -> bool {
        (**self).autocommit()
    }
}
