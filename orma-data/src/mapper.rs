//! Registration-time mapping of an entity declaration to columns and SQL.
//!
//! An entity is declared once with [`EntityMapper::builder`]. Building
//! validates the primary key and precompiles the four statement templates:
//!
//! ```
//! use orma_data::{Column, EntityMapper};
//!
//! let users = EntityMapper::builder("User")
//!     .table("users")
//!     .column("id", Column::integer().primary_key())
//!     .column("name", Column::string())
//!     .column("age", Column::integer())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(users.select_sql(), "select `id`, `name`, `age` from `users`");
//! assert_eq!(
//!     users.insert_sql(),
//!     "insert into `users` (`name`, `age`, `id`) values (?, ?, ?)"
//! );
//! assert_eq!(users.update_sql(), "update `users` set `name`=?, `age`=? where `id`=?");
//! assert_eq!(users.delete_sql(), "delete from `users` where `id`=?");
//! ```

use std::sync::Arc;

use crate::column::Column;
use crate::error::RegistrationError;
use crate::model::Model;
use crate::query::{placeholders, quote_identifier};

/// Declaration of an entity, consumed by [`EntityBuilder::build`].
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: String,
    table: Option<String>,
    columns: Vec<(String, Column)>,
}

impl EntityBuilder {
    /// Table name override. Defaults to the entity name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declare `attribute` as mapped by `column`. Declaration order is kept.
    pub fn column(mut self, attribute: impl Into<String>, column: Column) -> Self {
        self.columns.push((attribute.into(), column));
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Validate the declaration and precompile the statements.
    pub fn build(self) -> Result<Arc<EntityMapper>, RegistrationError> {
        EntityMapper::compile(self).map(Arc::new)
    }
}

/// Column metadata and precompiled statements of one entity type.
///
/// Shared read-only (`Arc<EntityMapper>`) by every [`Model`] of the entity.
#[derive(Debug)]
pub struct EntityMapper {
    entity: String,
    table: String,
    mappings: Vec<(String, Column)>,
    primary_key: usize,
    fields: Vec<String>,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl EntityMapper {
    pub fn builder(entity: impl Into<String>) -> EntityBuilder {
        EntityBuilder {
            entity: entity.into(),
            table: None,
            columns: Vec::new(),
        }
    }

    fn compile(builder: EntityBuilder) -> Result<Self, RegistrationError> {
        let EntityBuilder {
            entity,
            table,
            columns,
        } = builder;
        let table = table.unwrap_or_else(|| entity.clone());
        tracing::info!(entity = %entity, table = %table, "found model");

        let mut primary_key: Option<usize> = None;
        let mut fields = Vec::new();
        for (idx, (attribute, column)) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|(seen, _)| seen == attribute) {
                return Err(RegistrationError::DuplicateAttribute {
                    entity,
                    attribute: attribute.clone(),
                });
            }
            tracing::debug!(entity = %entity, "found mapping: {attribute} ==> {column}");
            if column.is_primary_key() {
                if primary_key.is_some() {
                    return Err(RegistrationError::DuplicatePrimaryKey {
                        entity,
                        attribute: attribute.clone(),
                    });
                }
                primary_key = Some(idx);
            } else {
                fields.push(attribute.clone());
            }
        }
        let primary_key =
            primary_key.ok_or_else(|| RegistrationError::MissingPrimaryKey { entity: entity.clone() })?;

        let column_of = |attribute: &str| -> String {
            let column = columns
                .iter()
                .find(|(name, _)| name == attribute)
                .map(|(name, column)| column.column_name(name))
                .unwrap_or(attribute);
            quote_identifier(column)
        };
        let (pk_attribute, pk_column) = &columns[primary_key];
        let pk = quote_identifier(pk_column.column_name(pk_attribute));
        let quoted_table = quote_identifier(&table);
        let field_columns: Vec<String> = fields.iter().map(|f| column_of(f)).collect();

        let select_sql = if field_columns.is_empty() {
            format!("select {pk} from {quoted_table}")
        } else {
            format!("select {pk}, {} from {quoted_table}", field_columns.join(", "))
        };

        let insert_columns: Vec<&str> = field_columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(pk.as_str()))
            .collect();
        let insert_sql = format!(
            "insert into {quoted_table} ({}) values ({})",
            insert_columns.join(", "),
            placeholders(insert_columns.len())
        );

        let assignments = if field_columns.is_empty() {
            // Key-only entity: a no-op assignment keeps the argument list `[pk]`.
            format!("{pk}={pk}")
        } else {
            field_columns
                .iter()
                .map(|c| format!("{c}=?"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let update_sql = format!("update {quoted_table} set {assignments} where {pk}=?");
        let delete_sql = format!("delete from {quoted_table} where {pk}=?");

        Ok(EntityMapper {
            entity,
            table,
            mappings: columns,
            primary_key,
            fields,
            select_sql,
            insert_sql,
            update_sql,
            delete_sql,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Attribute name of the primary key.
    pub fn primary_key(&self) -> &str {
        &self.mappings[self.primary_key].0
    }

    pub fn primary_key_column(&self) -> &Column {
        &self.mappings[self.primary_key].1
    }

    /// Non-key attribute names in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// All mapped attributes with their columns, in declaration order.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.mappings.iter().map(|(attr, col)| (attr.as_str(), col))
    }

    pub fn column(&self, attribute: &str) -> Option<&Column> {
        self.mappings
            .iter()
            .find(|(attr, _)| attr == attribute)
            .map(|(_, col)| col)
    }

    pub fn is_mapped(&self, attribute: &str) -> bool {
        self.column(attribute).is_some()
    }

    /// Column name an attribute is stored under.
    pub fn column_name<'a>(&'a self, attribute: &'a str) -> Option<&'a str> {
        self.mappings
            .iter()
            .find(|(attr, _)| attr == attribute)
            .map(|(attr, col)| col.column_name(attr))
    }

    /// Attribute mapped to a result column, if any.
    pub fn attribute_for_column(&self, column: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|(attr, col)| col.column_name(attr) == column)
            .map(|(attr, _)| attr.as_str())
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }

    /// ``select ... where `pk`=?``, used by `find`.
    pub fn select_by_key_sql(&self) -> String {
        let pk = self.primary_key_column().column_name(self.primary_key());
        format!("{} where {}=?", self.select_sql, quote_identifier(pk))
    }

    /// A new, empty instance of this entity.
    pub fn instance(self: &Arc<Self>) -> Model {
        Model::new(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> EntityBuilder {
        EntityMapper::builder("User")
            .column("id", Column::integer().primary_key())
            .column("name", Column::string())
            .column("age", Column::integer())
    }

    #[test]
    fn table_defaults_to_entity_name() {
        let mapper = user().build().unwrap();
        assert_eq!(mapper.table(), "User");
        assert_eq!(mapper.select_sql(), "select `id`, `name`, `age` from `User`");
        assert_eq!(mapper.primary_key(), "id");
        assert_eq!(mapper.fields(), ["name", "age"]);
    }

    #[test]
    fn insert_places_primary_key_last() {
        let mapper = EntityMapper::builder("Blog")
            .column("name", Column::string())
            .column("id", Column::string().ddl("varchar(50)").primary_key())
            .column("summary", Column::string().ddl("varchar(200)"))
            .column("created_at", Column::float())
            .build()
            .unwrap();
        assert_eq!(
            mapper.insert_sql(),
            "insert into `Blog` (`name`, `summary`, `created_at`, `id`) values (?, ?, ?, ?)"
        );
        assert_eq!(
            mapper.update_sql(),
            "update `Blog` set `name`=?, `summary`=?, `created_at`=? where `id`=?"
        );
        assert_eq!(
            mapper.select_sql(),
            "select `id`, `name`, `summary`, `created_at` from `Blog`"
        );
    }

    #[test]
    fn explicit_column_names_are_used_everywhere() {
        let mapper = EntityMapper::builder("User")
            .table("users")
            .column("id", Column::integer().named("user_id").primary_key())
            .column("email", Column::string().named("mail"))
            .build()
            .unwrap();
        assert_eq!(mapper.select_sql(), "select `user_id`, `mail` from `users`");
        assert_eq!(
            mapper.insert_sql(),
            "insert into `users` (`mail`, `user_id`) values (?, ?)"
        );
        assert_eq!(mapper.update_sql(), "update `users` set `mail`=? where `user_id`=?");
        assert_eq!(mapper.delete_sql(), "delete from `users` where `user_id`=?");
        assert_eq!(
            mapper.select_by_key_sql(),
            "select `user_id`, `mail` from `users` where `user_id`=?"
        );
        assert_eq!(mapper.attribute_for_column("mail"), Some("email"));
        assert_eq!(mapper.column_name("email"), Some("mail"));
    }

    #[test]
    fn key_only_entity_still_has_four_templates() {
        let mapper = EntityMapper::builder("Tag")
            .column("label", Column::string().primary_key())
            .build()
            .unwrap();
        assert_eq!(mapper.select_sql(), "select `label` from `Tag`");
        assert_eq!(mapper.insert_sql(), "insert into `Tag` (`label`) values (?)");
        assert_eq!(mapper.update_sql(), "update `Tag` set `label`=`label` where `label`=?");
        assert_eq!(mapper.delete_sql(), "delete from `Tag` where `label`=?");
    }

    #[test]
    fn missing_primary_key_fails() {
        let err = EntityMapper::builder("Log")
            .column("message", Column::text())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::MissingPrimaryKey {
                entity: "Log".into()
            }
        );
    }

    #[test]
    fn text_key_is_not_a_primary_key() {
        let err = EntityMapper::builder("Log")
            .column("message", Column::text().primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingPrimaryKey { .. }));
    }

    #[test]
    fn second_primary_key_fails() {
        let err = user()
            .column("email", Column::string().primary_key())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicatePrimaryKey {
                entity: "User".into(),
                attribute: "email".into()
            }
        );
    }

    #[test]
    fn repeated_attribute_fails() {
        let err = user().column("name", Column::text()).build().unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateAttribute { .. }));
    }

    #[test]
    fn every_single_key_declaration_builds() {
        for pk_position in 0..4 {
            let mut builder = EntityMapper::builder("Wide");
            for i in 0..4 {
                let column = if i == pk_position {
                    Column::integer().primary_key()
                } else {
                    Column::string()
                };
                builder = builder.column(format!("c{i}"), column);
            }
            let mapper = builder.build().unwrap();
            for sql in [
                mapper.select_sql(),
                mapper.insert_sql(),
                mapper.update_sql(),
                mapper.delete_sql(),
            ] {
                assert!(!sql.is_empty());
            }
            assert_eq!(mapper.insert_sql().matches('?').count(), 4);
            assert_eq!(mapper.primary_key(), format!("c{pk_position}"));
        }
    }
}
