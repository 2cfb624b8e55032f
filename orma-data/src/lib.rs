pub mod column;
pub mod crud;
pub mod entity;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod model;
pub mod page;
pub mod query;
pub mod registry;
pub mod repository;
pub mod row;
pub mod value;

pub use column::{Column, ColumnDefault, ColumnKind};
pub use crud::ModelRepository;
pub use entity::Entity;
pub use error::{DataError, ExecutionError, PersistenceError, PoolError, RegistrationError};
pub use executor::Executor;
pub use mapper::{EntityBuilder, EntityMapper};
pub use model::Model;
pub use page::{Page, Pageable};
pub use query::{Dialect, FindOptions, Limit};
pub use registry::MapperRegistry;
pub use repository::Repository;
pub use row::Row;
pub use value::{FromValue, Value};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        Column, DataError, Entity, EntityMapper, Executor, FindOptions, MapperRegistry, Model,
        ModelRepository, Page, Pageable, Repository, Row, Value,
    };
}
