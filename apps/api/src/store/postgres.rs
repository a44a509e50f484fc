use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RoastStore, StoreError};
use crate::models::roast::RoastRecord;

const UNIQUE_VIOLATION: &str = "23505";

pub struct PgRoastStore {
    pool: PgPool,
}

impl PgRoastStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoastStore for PgRoastStore {
    async fn insert(&self, record: &RoastRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO roasts (id, resume_text, roast, tips, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(&record.resume_text)
        .bind(&record.roast)
        .bind(&record.tips)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::Duplicate(record.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<RoastRecord>, StoreError> {
        let record = sqlx::query_as::<_, RoastRecord>(
            "SELECT id, resume_text, roast, tips, created_at FROM roasts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}
