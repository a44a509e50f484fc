//! Result Store: persistence of shared roasts.
//!
//! Backends implement [`RoastStore`]; the id-generation and not-found contract lives in
//! [`save`] and [`find`] so every backend behaves the same way.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::StoreBackend;
use crate::models::roast::RoastRecord;

pub mod data_api;
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Roast {0} not found")]
    NotFound(String),

    #[error("Roast {0} already exists")]
    Duplicate(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Data API error: {0}")]
    Api(String),
}

/// Keyed storage for roast records. Insert-only: no update, no delete.
///
/// Carried in `AppState` as `Arc<dyn RoastStore>`.
#[async_trait]
pub trait RoastStore: Send + Sync {
    /// Writes `record`. Fails with [`StoreError::Duplicate`] instead of overwriting.
    async fn insert(&self, record: &RoastRecord) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<RoastRecord>, StoreError>;
}

/// Persists a new record under a fresh random identifier and returns that identifier.
pub async fn save(
    store: &dyn RoastStore,
    resume_text: String,
    roast: String,
    tips: String,
) -> Result<Uuid, StoreError> {
    save_record(store, RoastRecord::new(resume_text, roast, tips)).await
}

/// Persists a record built by the caller, for when its identifier is needed before the write.
pub async fn save_record(store: &dyn RoastStore, record: RoastRecord) -> Result<Uuid, StoreError> {
    store.insert(&record).await?;
    info!("Saved roast {}", record.id);
    Ok(record.id)
}

/// Looks a record up by its identifier. Unknown and malformed identifiers are both misses.
pub async fn find(store: &dyn RoastStore, identifier: &str) -> Result<RoastRecord, StoreError> {
    let not_found = || StoreError::NotFound(identifier.to_string());
    let id = Uuid::parse_str(identifier.trim()).map_err(|_| not_found())?;
    store.get(id).await?.ok_or_else(not_found)
}

/// Connects the configured backend and provisions its table or collection.
pub async fn connect(backend: &StoreBackend) -> Result<Arc<dyn RoastStore>> {
    match backend {
        StoreBackend::Postgres { database_url } => {
            let pool = crate::db::create_pool(database_url).await?;
            crate::db::ensure_schema(&pool).await?;
            Ok(Arc::new(postgres::PgRoastStore::new(pool)))
        }
        StoreBackend::DataApi {
            endpoint,
            token,
            keyspace,
            collection,
        } => {
            let store = data_api::DataApiRoastStore::new(endpoint, token, keyspace, collection)?;
            store.ensure_collection().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory roast store; records are lost on restart");
            Ok(Arc::new(memory::MemoryRoastStore::default()))
        }
    }
}
