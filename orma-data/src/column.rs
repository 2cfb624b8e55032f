use std::sync::Arc;

use crate::value::Value;

/// Diagnostic class of a column descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
    Custom,
}

impl ColumnKind {
    fn class_name(self) -> &'static str {
        match self {
            ColumnKind::String => "StringColumn",
            ColumnKind::Boolean => "BooleanColumn",
            ColumnKind::Integer => "IntegerColumn",
            ColumnKind::Float => "FloatColumn",
            ColumnKind::Text => "TextColumn",
            ColumnKind::Custom => "Column",
        }
    }

    fn allows_primary_key(self) -> bool {
        !matches!(self, ColumnKind::Boolean | ColumnKind::Text)
    }
}

/// Default value of a column: a constant or a zero-argument producer.
#[derive(Clone)]
pub enum ColumnDefault {
    Value(Value),
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl ColumnDefault {
    pub fn resolve(&self) -> Value {
        match self {
            ColumnDefault::Value(value) => value.clone(),
            ColumnDefault::Producer(produce) => produce(),
        }
    }
}

impl std::fmt::Debug for ColumnDefault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ColumnDefault::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Describes one mapped attribute: column name, SQL type, key-ness and default.
///
/// Built with the typed constructors and handed to
/// [`EntityBuilder::column`](crate::mapper::EntityBuilder::column); the mapper
/// owns it from then on and only lends it out immutably.
///
/// ```
/// use orma_data::Column;
///
/// let id = Column::integer().primary_key();
/// let name = Column::string().ddl("varchar(50)");
/// let created_at = Column::float().default_with(|| 1.0.into());
/// assert_eq!(id.sql_type(), "bigint");
/// assert_eq!(name.sql_type(), "varchar(50)");
/// assert!(created_at.default().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Column {
    kind: ColumnKind,
    name: Option<String>,
    sql_type: String,
    primary_key: bool,
    default: Option<ColumnDefault>,
}

impl Column {
    /// A column with an arbitrary SQL type and no default.
    pub fn new(sql_type: impl Into<String>) -> Self {
        Self::of_kind(ColumnKind::Custom, sql_type, None)
    }

    /// `varchar(100)`, no default.
    pub fn string() -> Self {
        Self::of_kind(ColumnKind::String, "varchar(100)", None)
    }

    /// `boolean`, defaults to `false`. Never a primary key.
    pub fn boolean() -> Self {
        Self::of_kind(ColumnKind::Boolean, "boolean", Some(Value::Bool(false)))
    }

    /// `bigint`, defaults to `0`.
    pub fn integer() -> Self {
        Self::of_kind(ColumnKind::Integer, "bigint", Some(Value::Int(0)))
    }

    /// `real`, defaults to `0.0`.
    pub fn float() -> Self {
        Self::of_kind(ColumnKind::Float, "real", Some(Value::Float(0.0)))
    }

    /// `text`, no default. Never a primary key.
    pub fn text() -> Self {
        Self::of_kind(ColumnKind::Text, "text", None)
    }

    fn of_kind(kind: ColumnKind, sql_type: impl Into<String>, default: Option<Value>) -> Self {
        Self {
            kind,
            name: None,
            sql_type: sql_type.into(),
            primary_key: false,
            default: default.map(ColumnDefault::Value),
        }
    }

    /// Use `name` as the column name instead of the attribute name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into()).filter(|n: &String| !n.is_empty());
        self
    }

    /// Override the SQL type, e.g. `varchar(50)`.
    pub fn ddl(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = sql_type.into();
        self
    }

    /// Mark as the primary key. Ignored, with a warning, for boolean and text columns.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = self.kind.allows_primary_key();
        if !self.primary_key {
            tracing::warn!("{} cannot be a primary key, flag ignored", self.kind.class_name());
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ColumnDefault::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(ColumnDefault::Producer(Arc::new(produce)));
        self
    }

    pub fn no_default(mut self) -> Self {
        self.default = None;
        self
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Explicit column name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Column name for a column declared under `attribute`.
    pub fn column_name<'a>(&'a self, attribute: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(attribute)
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> Option<&ColumnDefault> {
        self.default.as_ref()
    }

    /// Resolve the default, invoking a producer. `None` without a default.
    pub fn resolve_default(&self) -> Option<Value> {
        self.default.as_ref().map(ColumnDefault::resolve)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<{}, {}:{}>",
            self.kind.class_name(),
            self.sql_type,
            self.name.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn typed_constructors_carry_original_defaults() {
        assert_eq!(Column::string().sql_type(), "varchar(100)");
        assert!(Column::string().resolve_default().is_none());
        assert_eq!(Column::boolean().resolve_default(), Some(Value::Bool(false)));
        assert_eq!(Column::integer().resolve_default(), Some(Value::Int(0)));
        assert_eq!(Column::float().resolve_default(), Some(Value::Float(0.0)));
        assert!(Column::text().resolve_default().is_none());
        assert_eq!(Column::new("datetime").sql_type(), "datetime");
    }

    #[test]
    fn boolean_and_text_never_become_primary_keys() {
        assert!(!Column::boolean().primary_key().is_primary_key());
        assert!(!Column::text().primary_key().is_primary_key());
        assert!(Column::string().primary_key().is_primary_key());
    }

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn dropped_primary_key_flag_is_warned() {
        use tracing_subscriber::layer::SubscriberExt;

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
        tracing::subscriber::with_default(subscriber, || {
            let _ = Column::text().primary_key();
            let _ = Column::boolean().primary_key();
            let _ = Column::integer().primary_key();
        });
        assert_eq!(warnings.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn display_shows_class_type_and_name() {
        assert_eq!(
            Column::integer().named("id").to_string(),
            "<IntegerColumn, bigint:id>"
        );
        assert_eq!(Column::string().to_string(), "<StringColumn, varchar(100):>");
    }

    #[test]
    fn empty_name_means_attribute_name() {
        let col = Column::string().named("");
        assert_eq!(col.name(), None);
        assert_eq!(col.column_name("email"), "email");
        assert_eq!(Column::string().named("mail").column_name("email"), "mail");
    }

    #[test]
    fn producer_runs_on_every_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let col = Column::string().default_with(move || {
            Value::Int(counter.fetch_add(1, Ordering::SeqCst) as i64)
        });
        assert_eq!(col.resolve_default(), Some(Value::Int(0)));
        assert_eq!(col.resolve_default(), Some(Value::Int(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
