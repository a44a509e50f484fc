use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A shared roast. Written once at share time and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoastRecord {
    pub id: Uuid,
    pub resume_text: String,
    pub roast: String,
    pub tips: String,
    pub created_at: DateTime<Utc>,
}

impl RoastRecord {
    /// A fresh record under a newly generated random identifier.
    pub fn new(resume_text: String, roast: String, tips: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_text,
            roast,
            tips,
            created_at: Utc::now(),
        }
    }
}
