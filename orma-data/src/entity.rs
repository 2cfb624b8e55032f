use std::sync::Arc;

use crate::error::DataError;
use crate::mapper::EntityMapper;
use crate::model::Model;
use crate::value::Value;

/// A typed struct backed by a registered entity mapper.
///
/// Implemented by hand: the mapper is usually kept in a `OnceLock`, and the
/// struct converts to and from the dynamic [`Model`].
///
/// # Example
///
/// ```
/// use std::sync::{Arc, OnceLock};
/// use orma_data::{Column, DataError, Entity, EntityMapper, Model};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Entity for User {
///     type Id = i64;
///
///     fn mapper() -> Arc<EntityMapper> {
///         static MAPPER: OnceLock<Arc<EntityMapper>> = OnceLock::new();
///         MAPPER
///             .get_or_init(|| {
///                 EntityMapper::builder("User")
///                     .table("users")
///                     .column("id", Column::integer().primary_key())
///                     .column("name", Column::string())
///                     .build()
///                     .expect("valid User declaration")
///             })
///             .clone()
///     }
///
///     fn id(&self) -> &i64 {
///         &self.id
///     }
///
///     fn from_model(model: &Model) -> Result<Self, DataError> {
///         Ok(User {
///             id: model.get_as("id")?,
///             name: model.get_as("name")?,
///         })
///     }
///
///     fn to_model(&self) -> Result<Model, DataError> {
///         Self::mapper()
///             .instance()
///             .with("id", self.id)?
///             .with("name", self.name.as_str())
///     }
/// }
///
/// assert_eq!(User::mapper().table(), "users");
/// ```
pub trait Entity: Send + Sync + Unpin + 'static {
    type Id: Clone + Into<Value> + Send + Sync + 'static;

    fn mapper() -> Arc<EntityMapper>;
    fn id(&self) -> &Self::Id;
    fn from_model(model: &Model) -> Result<Self, DataError>
    where
        Self: Sized;
    fn to_model(&self) -> Result<Model, DataError>;
}
