use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{DataError, PersistenceError};
use crate::executor::Executor;
use crate::mapper::EntityMapper;
use crate::query::{quote_identifier, FindOptions};
use crate::row::Row;
use crate::value::{FromValue, Value};

/// Result column holding the value of [`Model::find_number`].
const NUMBER_COLUMN: &str = "_num_";

/// One record of a registered entity: the shared mapper plus attribute values.
///
/// Only mapped attributes can be stored. An attribute that was never set reads
/// as `None`.
#[derive(Debug, Clone)]
pub struct Model {
    mapper: Arc<EntityMapper>,
    values: HashMap<String, Value>,
    /// Attributes whose column default has already been resolved.
    defaulted: HashSet<String>,
}

impl Model {
    pub fn new(mapper: Arc<EntityMapper>) -> Self {
        Self {
            mapper,
            values: HashMap::new(),
            defaulted: HashSet::new(),
        }
    }

    /// Build an instance from a result row. Columns the entity does not map
    /// are ignored.
    pub fn from_row(mapper: Arc<EntityMapper>, row: Row) -> Self {
        let mut values = HashMap::with_capacity(row.len());
        for (column, value) in row {
            if let Some(attribute) = mapper.attribute_for_column(&column) {
                values.insert(attribute.to_string(), value);
            }
        }
        Self {
            mapper,
            values,
            defaulted: HashSet::new(),
        }
    }

    pub fn mapper(&self) -> &Arc<EntityMapper> {
        &self.mapper
    }

    pub fn entity(&self) -> &str {
        self.mapper.entity()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed read. An unset attribute decodes as [`Value::Null`].
    pub fn get_as<T: FromValue>(&self, key: &str) -> Result<T, DataError> {
        T::from_value(self.values.get(key).unwrap_or(&Value::Null))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), DataError> {
        self.ensure_mapped(key)?;
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self, DataError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// The stored value, or the column default which is then stored.
    ///
    /// A producer default runs at most once per instance, even when it
    /// produces `Null`.
    pub fn get_or_default(&mut self, key: &str) -> Result<Value, DataError> {
        if let Some(value) = self
            .values
            .get(key)
            .filter(|v| !v.is_null() || self.defaulted.contains(key))
        {
            return Ok(value.clone());
        }
        let column = self.mapper.column(key).ok_or_else(|| DataError::UnknownAttribute {
            entity: self.mapper.entity().to_string(),
            attribute: key.to_string(),
        })?;
        let value = column.resolve_default().unwrap_or(Value::Null);
        tracing::debug!(entity = %self.mapper.entity(), "using default value for {key}: {value}");
        self.values.insert(key.to_string(), value.clone());
        self.defaulted.insert(key.to_string());
        Ok(value)
    }

    /// Stored attribute values, in no particular order.
    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    pub fn primary_key_value(&self) -> Value {
        self.value_or_null(self.mapper.primary_key())
    }

    fn value_or_null(&self, key: &str) -> Value {
        self.values.get(key).cloned().unwrap_or_default()
    }

    fn ensure_mapped(&self, key: &str) -> Result<(), DataError> {
        if self.mapper.is_mapped(key) {
            Ok(())
        } else {
            Err(DataError::UnknownAttribute {
                entity: self.mapper.entity().to_string(),
                attribute: key.to_string(),
            })
        }
    }

    /// Non-key values in declaration order, then the primary key.
    fn row_args(&self) -> Vec<Value> {
        self.mapper
            .fields()
            .iter()
            .map(|field| self.value_or_null(field))
            .chain(std::iter::once(self.primary_key_value()))
            .collect()
    }

    /// All instances matching `options`.
    pub async fn find_all<E: Executor>(
        mapper: &Arc<EntityMapper>,
        executor: &E,
        options: FindOptions,
    ) -> Result<Vec<Model>, DataError> {
        let (sql, args) = options.apply(mapper.select_sql());
        let rows = executor.run_query(&sql, &args, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| Model::from_row(Arc::clone(mapper), row))
            .collect())
    }

    /// The instance with primary key `pk`, or `None`.
    pub async fn find<E: Executor>(
        mapper: &Arc<EntityMapper>,
        executor: &E,
        pk: impl Into<Value>,
    ) -> Result<Option<Model>, DataError> {
        let sql = mapper.select_by_key_sql();
        let rows = executor.run_query(&sql, &[pk.into()], Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| Model::from_row(Arc::clone(mapper), row)))
    }

    /// A single aggregate over the table, e.g. `count(id)`.
    ///
    /// Runs ``select <expr> _num_ from `table` [where <clause>]`` and returns
    /// `None` when no row comes back.
    pub async fn find_number<E: Executor>(
        mapper: &Arc<EntityMapper>,
        executor: &E,
        select_expr: &str,
        where_clause: Option<&str>,
        args: &[Value],
    ) -> Result<Option<Value>, DataError> {
        let mut sql = format!(
            "select {select_expr} {NUMBER_COLUMN} from {}",
            quote_identifier(mapper.table())
        );
        if let Some(clause) = where_clause.filter(|c| !c.trim().is_empty()) {
            sql.push_str(" where ");
            sql.push_str(clause);
        }
        let rows = executor.run_query(&sql, args, Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.get(NUMBER_COLUMN).cloned()))
    }

    /// Insert this instance, filling unset attributes from column defaults.
    pub async fn save<E: Executor>(&mut self, executor: &E) -> Result<(), DataError> {
        let mut args = Vec::with_capacity(self.mapper.fields().len() + 1);
        let mapper = Arc::clone(&self.mapper);
        for field in mapper.fields() {
            args.push(self.get_or_default(field)?);
        }
        args.push(self.get_or_default(mapper.primary_key())?);
        self.mutate("insert", mapper.insert_sql(), &args, executor).await
    }

    /// Write all non-key values to the row with this primary key.
    pub async fn update<E: Executor>(&self, executor: &E) -> Result<(), DataError> {
        let args = self.row_args();
        self.mutate("update", self.mapper.update_sql(), &args, executor)
            .await
    }

    /// Delete the row with this primary key.
    pub async fn remove<E: Executor>(&self, executor: &E) -> Result<(), DataError> {
        let args = [self.primary_key_value()];
        self.mutate("remove", self.mapper.delete_sql(), &args, executor)
            .await
    }

    async fn mutate<E: Executor>(
        &self,
        operation: &'static str,
        sql: &str,
        args: &[Value],
        executor: &E,
    ) -> Result<(), DataError> {
        let affected = executor
            .run_mutation(sql, args, executor.autocommit())
            .await?;
        if affected != 1 {
            tracing::warn!(
                entity = %self.mapper.entity(),
                "failed to {operation} record: affected rows: {affected}"
            );
            return Err(PersistenceError {
                operation,
                entity: self.mapper.entity().to_string(),
                expected: 1,
                affected,
            }
            .into());
        }
        Ok(())
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.mapper, &other.mapper) && self.values == other.values
    }
}

/// Serializes set attributes as a map, in declaration order.
impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (attribute, _) in self.mapper.mappings() {
            if let Some(value) = self.values.get(attribute) {
                map.serialize_entry(attribute, value)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user() -> Arc<EntityMapper> {
        EntityMapper::builder("User")
            .table("users")
            .column("id", Column::integer().primary_key())
            .column("name", Column::string())
            .column("age", Column::integer())
            .build()
            .unwrap()
    }

    #[test]
    fn unset_attribute_is_none() {
        let model = user().instance();
        assert!(model.get("name").is_none());
        assert!(model.get("nope").is_none());
    }

    #[test]
    fn unmapped_set_fails() {
        let mut model = user().instance();
        let err = model.set("email", "a@b").unwrap_err();
        assert_eq!(err.to_string(), "User has no attribute email");
        assert!(model.values().is_empty());
    }

    #[test]
    fn get_or_default_stores_the_default() {
        let mut model = user().instance();
        assert_eq!(model.get_or_default("age").unwrap(), Value::Int(0));
        assert_eq!(model.get("age"), Some(&Value::Int(0)));
        assert_eq!(model.get_or_default("name").unwrap(), Value::Null);
        assert!(model.get_or_default("email").is_err());
    }

    #[test]
    fn producer_runs_once_per_instance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mapper = EntityMapper::builder("Session")
            .column(
                "id",
                Column::string().primary_key().default_with(move || {
                    Value::Text(format!("s{}", counter.fetch_add(1, Ordering::SeqCst)))
                }),
            )
            .build()
            .unwrap();
        let mut model = mapper.instance();
        let first = model.get_or_default("id").unwrap();
        let second = model.get_or_default("id").unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn null_producer_runs_once_per_instance() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mapper = EntityMapper::builder("Note")
            .column("id", Column::integer().primary_key())
            .column(
                "note",
                Column::text().default_with(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Value::Null
                }),
            )
            .build()
            .unwrap();
        let mut model = mapper.instance();
        assert_eq!(model.get_or_default("note").unwrap(), Value::Null);
        assert_eq!(model.get_or_default("note").unwrap(), Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_null_still_resolves_default() {
        let mut model = user().instance().with("age", Value::Null).unwrap();
        assert_eq!(model.get_or_default("age").unwrap(), Value::Int(0));
    }

    #[test]
    fn from_row_maps_columns_back_to_attributes() {
        let mapper = EntityMapper::builder("User")
            .column("id", Column::integer().named("user_id").primary_key())
            .column("name", Column::string())
            .build()
            .unwrap();
        let row = Row::new()
            .with("user_id", 7)
            .with("name", "a")
            .with("_num_", 1);
        let model = Model::from_row(mapper, row);
        assert_eq!(model.get("id"), Some(&Value::Int(7)));
        assert_eq!(model.get_as::<String>("name").unwrap(), "a");
        assert_eq!(model.values().len(), 2);
    }

    #[test]
    fn serializes_in_declaration_order() {
        let model = user()
            .instance()
            .with("age", 3)
            .and_then(|m| m.with("id", 1))
            .and_then(|m| m.with("name", "a"))
            .unwrap();
        assert_eq!(
            serde_json::to_string(&model).unwrap(),
            r#"{"id":1,"name":"a","age":3}"#
        );
    }
}
