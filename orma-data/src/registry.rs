use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::RegistrationError;
use crate::mapper::{EntityBuilder, EntityMapper};

/// Registered entity mappers, keyed by entity name.
///
/// Owned by the application and shared by reference; safe to read from many
/// tasks while registrations happen at startup.
#[derive(Debug, Default)]
pub struct MapperRegistry {
    mappers: DashMap<String, Arc<EntityMapper>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and store a mapper. An entity name can be registered only once.
    pub fn register(&self, builder: EntityBuilder) -> Result<Arc<EntityMapper>, RegistrationError> {
        match self.mappers.entry(builder.entity().to_string()) {
            Entry::Occupied(entry) => Err(RegistrationError::AlreadyRegistered {
                entity: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let mapper = builder.build()?;
                entry.insert(Arc::clone(&mapper));
                Ok(mapper)
            }
        }
    }

    pub fn get(&self, entity: &str) -> Option<Arc<EntityMapper>> {
        self.mappers.get(entity).map(|m| Arc::clone(m.value()))
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.mappers.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Registered entity names, in no particular order.
    pub fn entities(&self) -> Vec<String> {
        self.mappers.iter().map(|m| m.key().clone()).collect()
    }
}
