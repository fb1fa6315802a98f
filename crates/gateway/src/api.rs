//! StudyBuddy HTTP API.
//!
//! Endpoints:
//!
//! - `POST   /upload/file`  Upload a file (multipart: `file`, optional `title`)
//! - `POST   /upload/text`  Upload pasted text (form: `text`, `title`)
//! - `GET    /materials`  List material summaries
//! - `GET    /materials/{id}`  Get one material's content
//! - `DELETE /materials`  Remove every material
//! - `POST   /chat`  Ask StudyBuddy
//!
//! `/materials/upload`, `/materials/upload-text` and `/materials/list` are
//! aliases kept for the browser frontend.

use axum::{
    Router,
    extract::{Form, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use studybuddy_agent::{ChatReply, StudyBuddy};
use studybuddy_core::error::StoreError;
use studybuddy_core::event::{DomainEvent, EventBus};
use studybuddy_core::material::{Material, MaterialStore, MaterialSummary, MaterialType};
use studybuddy_store::{material_from_file, material_from_text};

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the API.
pub struct ApiState {
    pub store: Arc<dyn MaterialStore>,
    pub session: Arc<StudyBuddy>,
    pub event_bus: Arc<EventBus>,
}

pub type SharedApiState = Arc<ApiState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the material and chat routes.
pub fn api_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/upload/file", post(upload_file_handler))
        .route("/upload/text", post(upload_text_handler))
        .route("/materials", get(list_materials_handler).delete(clear_materials_handler))
        .route("/materials/list", get(list_materials_handler))
        .route("/materials/upload", post(upload_file_handler))
        .route("/materials/upload-text", post(upload_text_handler))
        .route("/materials/{id}", get(get_material_handler))
        .route("/chat", post(chat_handler))
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────

/// An error response with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            StoreError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

#[derive(Serialize, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, detail = %self.detail, "Request failed");
        }
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

// ── Uploads ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub material_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MaterialType,
    pub word_count: usize,
    pub message: String,
}

impl UploadResponse {
    fn for_material(material: &Material) -> Self {
        Self {
            material_id: material.id.clone(),
            title: material.title.clone(),
            kind: material.kind,
            word_count: material.word_count(),
            message: format!("Uploaded '{}'", material.title),
        }
    }
}

async fn store_material(state: &ApiState, material: Material) -> Result<UploadResponse, ApiError> {
    let response = UploadResponse::for_material(&material);
    let title = material.title.clone();
    let id = state.store.store(material).await?;

    info!(material_id = %id, title = %title, "Material stored");
    state.event_bus.publish(DomainEvent::MaterialStored {
        material_id: id,
        title,
        timestamp: Utc::now(),
    });
    Ok(response)
}

async fn upload_file_handler(
    State(state): State<SharedApiState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
                title = Some(text);
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Missing 'file' field"))?;
    let material = material_from_file(&filename, &bytes, title.as_deref())?;

    Ok(Json(store_material(&state, material).await?))
}

#[derive(Deserialize)]
struct UploadTextForm {
    text: String,
    #[serde(default = "default_text_title")]
    title: String,
}

fn default_text_title() -> String {
    "Untitled".into()
}

async fn upload_text_handler(
    State(state): State<SharedApiState>,
    Form(form): Form<UploadTextForm>,
) -> Result<Json<UploadResponse>, ApiError> {
    let material = material_from_text(form.text, form.title);
    Ok(Json(store_material(&state, material).await?))
}

// ── Materials ─────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct MaterialsListResponse {
    pub materials: Vec<MaterialSummary>,
    pub total_count: usize,
}

async fn list_materials_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<MaterialsListResponse>, ApiError> {
    let materials = state.store.summaries().await?;
    Ok(Json(MaterialsListResponse {
        total_count: materials.len(),
        materials,
    }))
}

#[derive(Serialize, Deserialize)]
pub struct MaterialDetail {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MaterialType,
    pub content: String,
}

async fn get_material_handler(
    State(state): State<SharedApiState>,
    Path(id): Path<String>,
) -> Result<Json<MaterialDetail>, ApiError> {
    let material = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Not found"))?;

    Ok(Json(MaterialDetail {
        id: material.id,
        title: material.title,
        kind: material.kind,
        content: material.content,
    }))
}

#[derive(Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

async fn clear_materials_handler(
    State(state): State<SharedApiState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.clear().await?;
    info!("All materials cleared");
    Ok(Json(MessageResponse {
        message: "Cleared".into(),
    }))
}

// ── Chat ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub material_ids: Option<Vec<String>>,
}

/// Always 200: model failures come back as an `error` reply.
async fn chat_handler(
    State(state): State<SharedApiState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatReply> {
    let material_ids = req.material_ids.unwrap_or_default();
    Json(state.session.chat(&req.message, &material_ids).await)
}
