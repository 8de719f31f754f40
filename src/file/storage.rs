//! Physical file storage for filevault.
//!
//! This module provides durable byte storage keyed by an opaque reference:
//! - UUID-based stored names, independent of client input
//! - Directory sharding by first 2 characters of the stored name
//! - Create-exclusive writes that never overwrite an existing object

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{Result, VaultError};

use super::DEFAULT_MAX_FILE_SIZE;

/// Longest extension carried over from the original filename.
const MAX_EXTENSION_LENGTH: usize = 16;

/// File storage backend for managing physical files.
///
/// Files are stored in a sharded directory structure:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// ├── cd/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for file storage.
    base_path: PathBuf,
    /// Upper bound on a single stored object's size.
    max_object_size: u64,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            max_object_size: DEFAULT_MAX_FILE_SIZE,
        })
    }

    /// Set a custom maximum object size.
    pub fn with_max_object_size(mut self, max_size: u64) -> Self {
        self.max_object_size = max_size;
        self
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the configured maximum object size.
    pub fn max_object_size(&self) -> u64 {
        self.max_object_size
    }

    /// Save content to storage under a freshly allocated stored name.
    ///
    /// The original filename contributes only a sanitized extension; the
    /// rest of the stored name is a generated UUID. The write is
    /// create-exclusive: if the allocated name already exists (however
    /// unlikely), a new name is allocated and the write retried, so an
    /// existing object is never overwritten.
    ///
    /// Returns the stored name (`{uuid}.{ext}` format).
    pub fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        if content.len() as u64 > self.max_object_size {
            return Err(VaultError::Validation(format!(
                "file exceeds the maximum size of {} bytes",
                self.max_object_size
            )));
        }

        loop {
            let stored_name = Self::generate_stored_name(original_name);
            let file_path = self.file_path(&stored_name)?;

            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent)?;
            }

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&file_path)
            {
                Ok(mut file) => {
                    file.write_all(content)?;
                    return Ok(stored_name);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Load the full content of a stored object.
    pub fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.file_path(stored_name)?;

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound("file".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a stored object for reading.
    ///
    /// Returns an async read handle suitable for streaming; the handle is
    /// released when dropped.
    pub async fn open(&self, stored_name: &str) -> Result<tokio::fs::File> {
        let file_path = self.file_path(stored_name)?;

        match tokio::fs::File::open(&file_path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound("file".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored object.
    ///
    /// Returns `true` if the object was deleted, `false` if it didn't
    /// exist, so callers can distinguish "already gone" from a real delete.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        let file_path = self.file_path(stored_name)?;

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a stored object exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.file_path(stored_name)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    /// Get the size of a stored object.
    pub fn file_size(&self, stored_name: &str) -> Result<u64> {
        let file_path = self.file_path(stored_name)?;

        match fs::metadata(&file_path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound("file".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Build the full path for a stored name: {base_path}/{shard}/{stored_name}.
    ///
    /// Stored names are generated by this module, but a corrupted metadata
    /// row must not be able to escape the storage root, so the name is
    /// validated before any path is constructed.
    fn file_path(&self, stored_name: &str) -> Result<PathBuf> {
        if stored_name.is_empty()
            || stored_name.contains('/')
            || stored_name.contains('\\')
            || stored_name.contains("..")
        {
            return Err(VaultError::NotFound("file".to_string()));
        }

        let shard = Self::shard(stored_name);
        Ok(self.base_path.join(shard).join(stored_name))
    }

    /// Shard directory for a stored name (first 2 characters).
    fn shard(stored_name: &str) -> &str {
        if stored_name.len() >= 2 {
            &stored_name[..2]
        } else {
            stored_name
        }
    }

    /// Extract a safe extension from a filename.
    ///
    /// Only short, ASCII-alphanumeric extensions are kept; anything else
    /// falls back to "bin".
    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LENGTH
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .unwrap_or("bin")
    }

    /// Generate a new UUID-based stored name with a sanitized extension.
    pub fn generate_stored_name(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        format!("{uuid}.{ext}")
    }
}
