//! PDF upload endpoint
//!
//! Files are written to the upload directory under a unique name and a
//! `file-ready` job is queued for the ingestion worker.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use crate::error::{Error, Result};
use crate::processing::{FileReadyPayload, FILE_READY_JOB};
use crate::server::state::AppState;

/// Multipart field carrying the document
pub const UPLOAD_FIELD: &str = "pdf";

/// Metadata of a stored upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub fieldname: String,
    pub originalname: String,
    pub encoding: String,
    pub mimetype: String,
    pub destination: String,
    pub filename: String,
    pub path: String,
    pub size: usize,
}

/// POST /upload/pdf - store a PDF and queue it for ingestion
pub async fn upload_pdf(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_input(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let Some(originalname) = field.file_name().and_then(sanitize_file_name) else {
            continue;
        };
        let mimetype = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_input(format!("Failed to read upload: {}", e)))?;

        let destination = state.upload_dir();
        let filename = unique_file_name(&originalname);
        let path = destination.join(&filename);
        tokio::fs::write(&path, &data).await?;

        tracing::info!("Stored upload {} ({} bytes)", path.display(), data.len());

        let file = UploadedFile {
            fieldname: UPLOAD_FIELD.to_string(),
            originalname,
            encoding: "7bit".to_string(),
            mimetype,
            destination: destination.display().to_string(),
            filename: filename.clone(),
            path: path.display().to_string(),
            size: data.len(),
        };

        state.queue().add(
            FILE_READY_JOB,
            &FileReadyPayload {
                filename,
                destination: file.destination.clone(),
                path: file.path.clone(),
            },
        )?;

        return Ok(Json(json!({
            "message": "PDF uploaded successfully",
            "file": file,
        }))
        .into_response());
    }

    Ok((
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "No file uploaded" })),
    )
        .into_response())
}

/// GET /queue - jobs waiting for the ingestion worker
pub async fn queue_status(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let queue = state.queue();
    let waiting = queue.waiting()?;

    Ok(Json(json!({
        "queue": queue.name(),
        "waiting": waiting.len(),
        "jobs": waiting,
    })))
}

/// Keep only the final path component of a client-supplied name
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Path::new(base)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// `{millis}-{random}-{original}`
fn unique_file_name(original: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}-{}", millis, suffix, original)
}
