//! File handlers for the HTTP API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::file::FileKind;
use crate::web::dto::{ApiResponse, FileResponse, RemovedResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Query parameters for listing files.
#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    /// Optional kind filter (`image`, `document`, `other`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Query parameters for batch deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteFilesQuery {
    /// Comma-separated list of file ids.
    pub ids: String,
}

/// Generate a safe Content-Disposition header value for file downloads.
///
/// The filename is sanitized to prevent header injection and uses RFC 5987
/// encoding for non-ASCII filenames:
/// - Control characters (including CR, LF) are removed
/// - Double quotes and backslashes are replaced in the ASCII fallback
/// - The filename* parameter carries the UTF-8 original
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    // For plain ASCII filenames, use the simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Parse the comma-separated ids parameter.
///
/// Malformed ids cannot name an existing file, so they are skipped the
/// same way unknown ids are.
fn parse_ids(ids: &str) -> Vec<Uuid> {
    ids.split(',')
        .filter_map(|s| Uuid::parse_str(s.trim()).ok())
        .collect()
}

/// GET /api/files - List the caller's files.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let kind = match query.kind.as_deref() {
        Some(value) => Some(
            value
                .parse::<FileKind>()
                .map_err(|_| ApiError::bad_request(format!("unknown file type: {value}")))?,
        ),
        None => None,
    };

    let records = state.files.find_all(claims.sub, kind).await?;

    let responses = records.into_iter().map(FileResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            content = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        tracing::debug!("Failed to read file content: {}", e);
                        ApiError::bad_request("Failed to read file")
                    })?
                    .to_vec(),
            );
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    let record = state.files.create(claims.sub, &filename, content).await?;

    Ok(Json(ApiResponse::new(FileResponse::from(record))))
}

/// DELETE /api/files - Delete files by id.
///
/// Ids that don't exist or belong to another owner are skipped; the
/// response carries the number actually removed.
pub async fn delete_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<DeleteFilesQuery>,
) -> Result<Json<ApiResponse<RemovedResponse>>, ApiError> {
    let ids = parse_ids(&query.ids);

    let removed = state.files.remove(claims.sub, &ids).await?;

    Ok(Json(ApiResponse::new(RemovedResponse { removed })))
}

/// GET /api/files/:id - Download a file.
///
/// Streams the bytes with a Content-Disposition attachment header; the
/// content type is guessed from the original filename.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<Uuid>,
) -> Result<Response<Body>, ApiError> {
    let (record, file) = state.files.fetch(claims.sub, file_id).await?;

    let content_type = mime_guess::from_path(&record.original_name)
        .first_or_octet_stream()
        .to_string();

    // The handle is dropped with the stream on every exit path, including
    // client disconnect.
    let stream = ReaderStream::new(file);

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.original_name),
        )
        .header(header::CONTENT_LENGTH, record.size)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}
