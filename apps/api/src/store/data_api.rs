//! Roast store backed by a JSON Data API document database (Astra-style).
//!
//! Every operation is a single POST of a one-key command document:
//! `findCollections` / `createCollection` against the keyspace, and
//! `insertOne` / `findOne` against the collection. Command failures come back with
//! HTTP 200 and an `errors` array.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::{RoastStore, StoreError};
use crate::models::roast::RoastRecord;

const API_PATH: &str = "api/json/v1";
const DOCUMENT_ALREADY_EXISTS: &str = "DOCUMENT_ALREADY_EXISTS";

pub struct DataApiRoastStore {
    client: Client,
    keyspace_url: String,
    collection: String,
    token: String,
}

/// On-the-wire document. Records written before `created_at` existed read back with "now".
#[derive(Debug, Serialize, Deserialize)]
struct RoastDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    resume_text: String,
    roast: String,
    tips: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<&RoastRecord> for RoastDocument {
    fn from(record: &RoastRecord) -> Self {
        Self {
            id: record.id,
            resume_text: record.resume_text.clone(),
            roast: record.roast.clone(),
            tips: record.tips.clone(),
            created_at: record.created_at,
        }
    }
}

impl From<RoastDocument> for RoastRecord {
    fn from(doc: RoastDocument) -> Self {
        Self {
            id: doc.id,
            resume_text: doc.resume_text,
            roast: doc.roast,
            tips: doc.tips,
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    errors: Vec<CommandError>,
}

#[derive(Debug, Deserialize)]
struct CommandError {
    message: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl CommandResponse {
    fn ensure_ok(&self) -> Result<(), StoreError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        Err(StoreError::Api(messages.join("; ")))
    }

    fn has_error_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.error_code.as_deref() == Some(code))
    }
}

impl DataApiRoastStore {
    pub fn new(
        endpoint: &str,
        token: &str,
        keyspace: &str,
        collection: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            keyspace_url: format!("{}/{API_PATH}/{keyspace}", endpoint.trim_end_matches('/')),
            collection: collection.to_string(),
            token: token.to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.keyspace_url, self.collection)
    }

    async fn command(&self, url: &str, body: Value) -> Result<CommandResponse, StoreError> {
        let response = self
            .client
            .post(url)
            .header("Token", &self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("status {status}: {}", text.trim())));
        }

        Ok(response.json::<CommandResponse>().await?)
    }

    /// Creates the collection if it is absent, otherwise reuses it.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        let listing = self
            .command(&self.keyspace_url, json!({ "findCollections": {} }))
            .await?;
        listing.ensure_ok()?;

        let exists = listing
            .status
            .get("collections")
            .and_then(|c| c.as_array())
            .map(|names| names.iter().any(|n| n.as_str() == Some(self.collection.as_str())))
            .unwrap_or(false);

        if exists {
            info!("Reusing Data API collection '{}'", self.collection);
            return Ok(());
        }

        self.command(
            &self.keyspace_url,
            json!({ "createCollection": { "name": self.collection } }),
        )
        .await?
        .ensure_ok()?;
        info!("Created Data API collection '{}'", self.collection);
        Ok(())
    }
}

#[async_trait]
impl RoastStore for DataApiRoastStore {
    async fn insert(&self, record: &RoastRecord) -> Result<(), StoreError> {
        let document = serde_json::to_value(RoastDocument::from(record))
            .map_err(|e| StoreError::Api(e.to_string()))?;
        let response = self
            .command(
                &self.collection_url(),
                json!({ "insertOne": { "document": document } }),
            )
            .await?;

        if response.has_error_code(DOCUMENT_ALREADY_EXISTS) {
            return Err(StoreError::Duplicate(record.id));
        }
        response.ensure_ok()
    }

    async fn get(&self, id: Uuid) -> Result<Option<RoastRecord>, StoreError> {
        let response = self
            .command(
                &self.collection_url(),
                json!({ "findOne": { "filter": { "_id": id.to_string() } } }),
            )
            .await?;
        response.ensure_ok()?;

        match response.data.get("document") {
            None | Some(Value::Null) => {
                debug!("Data API has no document {id}");
                Ok(None)
            }
            Some(document) => {
                let document: RoastDocument = serde_json::from_value(document.clone())
                    .map_err(|e| StoreError::Api(format!("unexpected document shape: {e}")))?;
                Ok(Some(document.into()))
            }
        }
    }
}
