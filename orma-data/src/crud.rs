use std::marker::PhantomData;

use crate::entity::Entity;
use crate::error::DataError;
use crate::executor::Executor;
use crate::model::Model;
use crate::page::{Page, Pageable};
use crate::query::FindOptions;
use crate::repository::Repository;
use crate::value::Value;

/// [`Repository`] for a typed [`Entity`] over any [`Executor`].
///
/// # Example
///
/// ```ignore
/// let repo = ModelRepository::<User, _>::new(executor.clone());
/// let users = repo.find_all(FindOptions::new().order_by("`id`")).await?;
/// ```
pub struct ModelRepository<T, E> {
    executor: E,
    _marker: PhantomData<fn() -> T>,
}

impl<T, E> ModelRepository<T, E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            _marker: PhantomData,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<T, E: Clone> Clone for ModelRepository<T, E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity, E: Executor> ModelRepository<T, E> {
    async fn count_where(&self, options: &FindOptions) -> Result<u64, DataError> {
        let number = Model::find_number(
            &T::mapper(),
            &self.executor,
            "count(*)",
            options.where_clause(),
            options.args(),
        )
        .await?;
        match number {
            Some(Value::Int(n)) => Ok(u64::try_from(n).unwrap_or(0)),
            Some(other) => Err(DataError::Decode(format!(
                "count returned a non-integer value: {other}"
            ))),
            None => Ok(0),
        }
    }
}

impl<T: Entity, E: Executor> Repository<T, T::Id> for ModelRepository<T, E> {
    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, DataError> {
        let model = Model::find(&T::mapper(), &self.executor, id.clone()).await?;
        model.as_ref().map(T::from_model).transpose()
    }

    async fn find_all(&self, options: FindOptions) -> Result<Vec<T>, DataError> {
        Model::find_all(&T::mapper(), &self.executor, options)
            .await?
            .iter()
            .map(T::from_model)
            .collect()
    }

    async fn find_all_paged(&self, pageable: &Pageable) -> Result<Page<T>, DataError> {
        let total = self.count_where(&FindOptions::new()).await?;
        let content = self.find_all(pageable.find_options()).await?;
        Ok(Page::new(content, pageable, total))
    }

    async fn save(&self, entity: &T) -> Result<T, DataError> {
        let mut model = entity.to_model()?;
        model.save(&self.executor).await?;
        T::from_model(&model)
    }

    async fn update(&self, entity: &T) -> Result<(), DataError> {
        entity.to_model()?.update(&self.executor).await
    }

    async fn delete(&self, id: &T::Id) -> Result<bool, DataError> {
        let model = T::mapper()
            .instance()
            .with(T::mapper().primary_key(), id.clone())?;
        match model.remove(&self.executor).await {
            Ok(()) => Ok(true),
            Err(DataError::Persistence(err)) if err.affected == 0 => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn count(&self) -> Result<u64, DataError> {
        self.count_where(&FindOptions::new()).await
    }
}
