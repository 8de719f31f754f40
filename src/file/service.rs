//! File access service.
//!
//! The ownership boundary of filevault: the only entry point the HTTP
//! layer calls. Every read and delete is scoped to the authenticated
//! owner, and creation keeps bytes and metadata consistent.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::{Result, VaultError};

use super::record::{FileKind, FileRecord, FileRepository, NewFileRecord};
use super::storage::FileStorage;
use super::{DEFAULT_MAX_FILE_SIZE, MAX_FILENAME_LENGTH};

/// High-level file operations with ownership enforcement.
#[derive(Debug, Clone)]
pub struct FileService {
    db: Database,
    storage: FileStorage,
    max_file_size: u64,
}

impl FileService {
    /// Create a new FileService.
    pub fn new(db: Database, storage: FileStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.storage = self.storage.with_max_object_size(max_size);
        self.max_file_size = max_size;
        self
    }

    /// Get the storage backend used by this service.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Get the configured max file size.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Store an uploaded file for the given owner.
    ///
    /// # Validation
    /// - Filename: non-empty after sanitization, bounded length
    /// - File size: within the configured maximum
    ///
    /// Bytes and metadata are kept consistent: if the metadata insert
    /// fails after the bytes were stored, the stored bytes are removed
    /// before the error propagates.
    pub async fn create(
        &self,
        owner_id: i64,
        original_name: &str,
        content: Vec<u8>,
    ) -> Result<FileRecord> {
        let display_name = sanitize_original_name(original_name)?;

        if content.len() as u64 > self.max_file_size {
            return Err(VaultError::Validation(format!(
                "file exceeds the maximum size of {} bytes",
                self.max_file_size
            )));
        }

        let kind = FileKind::from_original_name(&display_name);
        let stored_name = self.storage.save(&content, &display_name)?;

        let new_record = NewFileRecord::new(
            owner_id,
            &display_name,
            &stored_name,
            kind,
            content.len() as i64,
        );

        let repo = FileRepository::new(self.db.pool());
        match repo.create(&new_record).await {
            Ok(record) => {
                debug!(
                    owner_id,
                    file_id = %record.id,
                    size = record.size,
                    "file stored"
                );
                Ok(record)
            }
            Err(e) => {
                // Metadata failed after the bytes were written; clean up
                // the orphan before reporting the error.
                if let Err(cleanup) = self.storage.delete(&stored_name) {
                    warn!(
                        stored_name,
                        error = %cleanup,
                        "failed to remove orphaned bytes after metadata error"
                    );
                }
                Err(e)
            }
        }
    }

    /// List the owner's files, optionally filtered by kind.
    ///
    /// Ordered by upload time ascending, ties broken by id.
    pub async fn find_all(
        &self,
        owner_id: i64,
        kind: Option<FileKind>,
    ) -> Result<Vec<FileRecord>> {
        let repo = FileRepository::new(self.db.pool());
        repo.list_by_owner(owner_id, kind).await
    }

    /// Delete the given ids that exist and belong to the owner.
    ///
    /// Ids that are missing or belong to another owner are skipped
    /// silently; the batch never fails part-way. Returns the number of
    /// files actually removed.
    pub async fn remove(&self, owner_id: i64, ids: &[Uuid]) -> Result<u64> {
        let repo = FileRepository::new(self.db.pool());
        let mut removed = 0u64;

        for &id in ids {
            let Some(stored_name) = repo.delete_owned(owner_id, id).await? else {
                continue;
            };
            removed += 1;

            // The row is gone, so the bytes are unreachable either way;
            // a failure here only leaves an orphan on disk.
            match self.storage.delete(&stored_name) {
                Ok(true) => {}
                Ok(false) => debug!(stored_name, "bytes already absent during delete"),
                Err(e) => warn!(stored_name, error = %e, "failed to delete stored bytes"),
            }
        }

        Ok(removed)
    }

    /// Fetch a file record and a read handle on its bytes.
    ///
    /// Returns `NotFound` uniformly whether the id does not exist or
    /// belongs to another owner.
    pub async fn fetch(&self, owner_id: i64, id: Uuid) -> Result<(FileRecord, tokio::fs::File)> {
        let repo = FileRepository::new(self.db.pool());
        let record = repo
            .get_owned(owner_id, id)
            .await?
            .ok_or_else(|| VaultError::NotFound("file".to_string()))?;

        let file = self.storage.open(&record.stored_name).await?;

        Ok((record, file))
    }
}

/// Sanitize a client-supplied filename into a display name.
///
/// Browsers may submit a full path; only the final component is kept.
/// The result is used as display metadata and for extension/MIME
/// guessing, never as a storage path.
fn sanitize_original_name(name: &str) -> Result<String> {
    let name = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(VaultError::Validation(
            "file name must not be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_FILENAME_LENGTH {
        return Err(VaultError::Validation(format!(
            "file name must be at most {MAX_FILENAME_LENGTH} characters"
        )));
    }

    Ok(name.to_string())
}
