//! File record types and metadata repository.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DbPool;
use crate::{Result, VaultError};

/// Classification of a stored file, derived from its filename at upload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FileKind {
    /// Raster/vector images.
    Image,
    /// Text and office documents (pdf, plain text, word processor formats).
    Document,
    /// Everything else.
    Other,
}

impl FileKind {
    /// Classify a file by its original name's MIME guess.
    pub fn from_original_name(name: &str) -> Self {
        let mime = mime_guess::from_path(name).first_or_octet_stream();

        if mime.type_() == mime_guess::mime::IMAGE {
            return FileKind::Image;
        }
        if mime.type_() == mime_guess::mime::TEXT {
            return FileKind::Document;
        }
        if mime.type_() == mime_guess::mime::APPLICATION {
            let sub = mime.subtype();
            if sub == mime_guess::mime::PDF
                || sub.as_str() == "msword"
                || sub.as_str() == "rtf"
                || sub.as_str().starts_with("vnd.openxmlformats-officedocument")
                || sub.as_str().starts_with("vnd.oasis.opendocument")
            {
                return FileKind::Document;
            }
        }

        FileKind::Other
    }

    /// String form used in the database and the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Document => "document",
            FileKind::Other => "other",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(FileKind::Image),
            "document" => Ok(FileKind::Document),
            "other" => Ok(FileKind::Other),
            _ => Err(VaultError::Validation(format!("unknown file type: {s}"))),
        }
    }
}

/// Metadata for one stored file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: Uuid,
    /// User ID of the owner; immutable after creation.
    pub owner_id: i64,
    /// Original filename (display name only).
    pub original_name: String,
    /// Stored name in the storage backend (UUID.ext format).
    pub stored_name: String,
    /// File classification.
    pub kind: FileKind,
    /// File size in bytes.
    pub size: i64,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// User ID of the owner.
    pub owner_id: i64,
    /// Original filename (display name only).
    pub original_name: String,
    /// Stored name in the storage backend.
    pub stored_name: String,
    /// File classification.
    pub kind: FileKind,
    /// File size in bytes.
    pub size: i64,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        owner_id: i64,
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        kind: FileKind,
        size: i64,
    ) -> Self {
        Self {
            owner_id,
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            kind,
            size,
        }
    }
}

/// Repository for file record operations.
///
/// Every query is scoped by owner; there is deliberately no way to resolve
/// a record by id alone.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new file record with a freshly generated id.
    pub async fn create(&self, file: &NewFileRecord) -> Result<FileRecord> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO files (id, owner_id, original_name, stored_name, kind, size, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(file.owner_id)
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(file.kind)
        .bind(file.size)
        .bind(created_at)
        .execute(self.pool)
        .await?;

        self.get_owned(file.owner_id, id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))
    }

    /// Get a record by id, scoped to its owner.
    ///
    /// Returns `None` both when the id does not exist and when it belongs
    /// to a different owner.
    pub async fn get_owned(&self, owner_id: i64, id: Uuid) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "SELECT id, owner_id, original_name, stored_name, kind, size, created_at
             FROM files WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// List an owner's records, optionally restricted to one kind.
    ///
    /// Ordered by created_at ascending, ties broken by id.
    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileRecord>> {
        let records = match kind {
            Some(kind) => {
                sqlx::query_as::<_, FileRecord>(
                    "SELECT id, owner_id, original_name, stored_name, kind, size, created_at
                     FROM files WHERE owner_id = $1 AND kind = $2
                     ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .bind(kind)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FileRecord>(
                    "SELECT id, owner_id, original_name, stored_name, kind, size, created_at
                     FROM files WHERE owner_id = $1
                     ORDER BY created_at ASC, id ASC",
                )
                .bind(owner_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(records)
    }

    /// Delete a record by id, scoped to its owner.
    ///
    /// Returns the stored name of the deleted record, or `None` when the
    /// id does not exist or belongs to a different owner.
    pub async fn delete_owned(&self, owner_id: i64, id: Uuid) -> Result<Option<String>> {
        let stored_name: Option<String> = sqlx::query_scalar(
            "DELETE FROM files WHERE id = $1 AND owner_id = $2 RETURNING stored_name",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(stored_name)
    }
}
