use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{RoastStore, StoreError};
use crate::models::roast::RoastRecord;

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryRoastStore {
    records: RwLock<HashMap<Uuid, RoastRecord>>,
}

#[cfg(test)]
impl MemoryRoastStore {
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RoastStore for MemoryRoastStore {
    async fn insert(&self, record: &RoastRecord) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Api("memory store lock poisoned".to_string()))?;
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<RoastRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::Api("memory store lock poisoned".to_string()))?;
        Ok(records.get(&id).cloned())
    }
}
