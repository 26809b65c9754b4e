use std::collections::HashMap;

use parking_lot::RwLock;

use crate::id::Id;
use crate::record::{ConfigRecord, SchemaRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for schema records. Saving replaces any record with the same id.
pub trait SchemaStore: Send + Sync {
    fn find(&self, id: &Id) -> Result<Option<SchemaRecord>, StoreError>;
    fn save(&self, record: &SchemaRecord) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete(&self, id: &Id) -> Result<bool, StoreError>;
}

/// Persistence for config records. Saving replaces any record with the same id.
pub trait ConfigStore: Send + Sync {
    fn find(&self, id: &Id) -> Result<Option<ConfigRecord>, StoreError>;
    /// Configs bound to `schema_id`, ordered by id.
    fn find_by_schema(&self, schema_id: &Id) -> Result<Vec<ConfigRecord>, StoreError>;
    fn save(&self, record: &ConfigRecord) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete(&self, id: &Id) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    records: RwLock<HashMap<Id, SchemaRecord>>,
}

impl InMemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl SchemaStore for InMemorySchemaStore {
    fn find(&self, id: &Id) -> Result<Option<SchemaRecord>, StoreError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn save(&self, record: &SchemaRecord) -> Result<(), StoreError> {
        self.records.write().insert(record.id().clone(), record.clone());
        Ok(())
    }

    fn delete(&self, id: &Id) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    records: RwLock<HashMap<Id, ConfigRecord>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn find(&self, id: &Id) -> Result<Option<ConfigRecord>, StoreError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn find_by_schema(&self, schema_id: &Id) -> Result<Vec<ConfigRecord>, StoreError> {
        let mut found: Vec<ConfigRecord> = self
            .records
            .read()
            .values()
            .filter(|record| record.schema_id() == schema_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(found)
    }

    fn save(&self, record: &ConfigRecord) -> Result<(), StoreError> {
        self.records.write().insert(record.id().clone(), record.clone());
        Ok(())
    }

    fn delete(&self, id: &Id) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(id).is_some())
    }
}
