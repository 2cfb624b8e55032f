//! Conversion between [`orma_data::Value`] and the sqlx `Any` driver.

use futures_util::TryStreamExt;
use orma_data::{Row, Value};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::AnyConnection;
use sqlx::query::Query;
use sqlx::{Any, Column, Row as _, TypeInfo, ValueRef};

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// Postgres nulls never get here, see [`orma_data::Dialect::prepare`].
pub(crate) fn bind_values<'q>(mut query: AnyQuery<'q>, args: &[Value]) -> AnyQuery<'q> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
            Value::Bytes(b) => query.bind(b.clone()),
        };
    }
    query
}

/// Decode every column of `row`, keeping the driver's column order.
pub(crate) fn decode_row(row: &AnyRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::new();
    for column in row.columns() {
        decoded.push(column.name(), column_value(row, column.ordinal())?);
    }
    Ok(decoded)
}

fn column_value(row: &AnyRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();
    Ok(match type_name.as_str() {
        "NULL" => Value::Null,
        "BOOLEAN" => Value::Bool(row.try_get_unchecked(index)?),
        "SMALLINT" => Value::Int(i64::from(row.try_get_unchecked::<i16, _>(index)?)),
        "INTEGER" => Value::Int(i64::from(row.try_get_unchecked::<i32, _>(index)?)),
        "BIGINT" => Value::Int(row.try_get_unchecked(index)?),
        "REAL" => Value::Float(f64::from(row.try_get_unchecked::<f32, _>(index)?)),
        "DOUBLE" => Value::Float(row.try_get_unchecked(index)?),
        "TEXT" => Value::Text(row.try_get_unchecked(index)?),
        "BLOB" => Value::Bytes(row.try_get_unchecked(index)?),
        other => {
            return Err(sqlx::Error::ColumnDecode {
                index: index.to_string(),
                source: format!("unsupported column type {other}").into(),
            })
        }
    })
}

/// Run a read statement, stopping after `row_limit` rows when given.
pub(crate) async fn fetch_rows(
    conn: &mut AnyConnection,
    sql: &str,
    args: &[Value],
    row_limit: Option<usize>,
) -> Result<Vec<Row>, sqlx::Error> {
    let query = bind_values(sqlx::query(sql), args);
    match row_limit {
        Some(limit) => {
            let mut rows = Vec::with_capacity(limit.min(64));
            let mut stream = query.fetch(conn);
            while rows.len() < limit {
                match stream.try_next().await? {
                    Some(row) => rows.push(decode_row(&row)?),
                    None => break,
                }
            }
            Ok(rows)
        }
        None => query.fetch_all(conn).await?.iter().map(decode_row).collect(),
    }
}

/// Run a data-modifying statement and return the affected-row count.
pub(crate) async fn execute(
    conn: &mut AnyConnection,
    sql: &str,
    args: &[Value],
) -> Result<u64, sqlx::Error> {
    let result = bind_values(sqlx::query(sql), args).execute(conn).await?;
    Ok(result.rows_affected())
}
