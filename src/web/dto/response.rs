//! Response DTOs for the HTTP API.

use serde::Serialize;
use uuid::Uuid;

use crate::file::{FileKind, FileRecord};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// File record as exposed over the API.
///
/// The stored name is deliberately absent; storage locations are not part
/// of the API surface.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: Uuid,
    /// Original filename.
    pub name: String,
    /// File classification.
    pub kind: FileKind,
    /// File size in bytes.
    pub size: i64,
    /// Upload timestamp (RFC 3339).
    pub created_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.original_name,
            kind: record.kind,
            size: record.size,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Result of a batch delete.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    /// Number of files actually removed.
    pub removed: u64,
}
