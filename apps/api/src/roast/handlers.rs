//! Axum route handlers for the Roast API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{self, UploadedDocument};
use crate::llm_client::{Generation, LlmError, Notice};
use crate::models::roast::RoastRecord;
use crate::roast::pipeline::{roast_resume, RoastOutcome};
use crate::roast::share::{share_links, ShareLinks};
use crate::state::AppState;
use crate::store;

/// Multipart field carrying the resume.
const UPLOAD_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// One generated section, or the message shown in its place.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutput {
    Ok { text: String },
    Failed { message: String, reason: String },
}

impl From<Result<String, LlmError>> for SectionOutput {
    fn from(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) => SectionOutput::Ok { text },
            Err(e) => SectionOutput::Failed {
                message: e.user_message().to_string(),
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NoticeView {
    pub section: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub notice: Notice,
}

#[derive(Debug, Serialize)]
pub struct RoastResponse {
    pub resume_text: String,
    pub roast: SectionOutput,
    pub tips: SectionOutput,
    pub notices: Vec<NoticeView>,
}

impl RoastResponse {
    fn new(resume_text: String, outcome: RoastOutcome) -> Self {
        let mut notices = Vec::new();
        let roast = section("roast", outcome.roast, &mut notices);
        let tips = section("tips", outcome.tips, &mut notices);
        Self {
            resume_text,
            roast,
            tips,
            notices,
        }
    }
}

fn section(name: &'static str, generation: Generation, notices: &mut Vec<NoticeView>) -> SectionOutput {
    notices.extend(generation.notices.into_iter().map(|notice| NoticeView {
        section: name,
        message: notice.to_string(),
        notice,
    }));
    generation.result.into()
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub resume_text: String,
    pub roast: String,
    pub tips: String,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub roast_id: Uuid,
    #[serde(flatten)]
    pub links: ShareLinks,
}

/// What a shared link shows. The resume itself stays private.
#[derive(Debug, Serialize)]
pub struct SharedRoastView {
    pub roast_id: Uuid,
    pub roast: String,
    pub tips: String,
    pub created_at: DateTime<Utc>,
}

impl From<RoastRecord> for SharedRoastView {
    fn from(record: RoastRecord) -> Self {
        Self {
            roast_id: record.id,
            roast: record.roast,
            tips: record.tips,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SharedRoastQuery {
    pub roast_id: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/roasts
///
/// Multipart upload (field `file`) → extract text → roast + tips.
/// A failed generation is reported inside its section; the request itself still succeeds.
pub async fn handle_create_roast(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RoastResponse>, AppError> {
    let document = read_upload(multipart, state.config.max_upload_bytes).await?;
    let resume_text = extract_resume(document).await?;

    if resume_text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the uploaded resume".to_string(),
        ));
    }
    info!("Resume extracted: {} chars", resume_text.len());

    let outcome = roast_resume(&state.llm, &resume_text).await;
    Ok(Json(RoastResponse::new(resume_text, outcome)))
}

/// POST /api/v1/roasts/share
///
/// Persists a roast under a new identifier and returns the links to share it.
pub async fn handle_share_roast(
    State(state): State<AppState>,
    Json(request): Json<ShareRequest>,
) -> Result<(StatusCode, Json<ShareResponse>), AppError> {
    if request.roast.trim().is_empty() {
        return Err(AppError::Validation("roast cannot be empty".to_string()));
    }

    let record = RoastRecord::new(request.resume_text, request.roast, request.tips);
    let links = share_links(&state.config.public_base_url, record.id, &record.roast)?;
    let roast_id = store::save_record(state.store.as_ref(), record).await?;

    Ok((StatusCode::CREATED, Json(ShareResponse { roast_id, links })))
}

/// GET /api/v1/roasts/:id
pub async fn handle_get_roast(
    State(state): State<AppState>,
    Path(roast_id): Path<String>,
) -> Result<Json<SharedRoastView>, AppError> {
    let record = store::find(state.store.as_ref(), &roast_id).await?;
    Ok(Json(record.into()))
}

/// GET /?roast_id=<id>
///
/// Landing point of a share link. With `roast_id` the stored roast is returned directly and
/// no generation happens; without it, a short description of the API.
pub async fn handle_landing(
    State(state): State<AppState>,
    Query(query): Query<SharedRoastQuery>,
) -> Result<Json<Value>, AppError> {
    match query.roast_id.as_deref().map(str::trim) {
        Some(roast_id) if !roast_id.is_empty() => {
            let record = store::find(state.store.as_ref(), roast_id).await?;
            let view = SharedRoastView::from(record);
            Ok(Json(serde_json::to_value(view).map_err(anyhow::Error::from)?))
        }
        _ => Ok(Json(json!({
            "service": "roaster",
            "upload": "POST /api/v1/roasts (multipart field 'file', PDF or DOCX)",
            "share": "POST /api/v1/roasts/share",
            "view": "GET /?roast_id=<id>"
        }))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, max_upload_bytes))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| upload_error(e, max_upload_bytes))?;
        return Ok(UploadedDocument::new(content, media_type));
    }

    Err(AppError::Validation(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// The body limit surfaces as a multipart stream error; keep its 413 instead of folding it into 400.
fn upload_error(e: MultipartError, max_upload_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Upload exceeds the {max_upload_bytes} byte limit"
        ))
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// Extraction is CPU-bound, so it runs on the blocking pool.
async fn extract_resume(document: UploadedDocument) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extraction::extract(&document))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
