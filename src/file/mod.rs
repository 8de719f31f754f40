//! File storage and access control for filevault.
//!
//! This module provides the core of the service:
//! - Physical byte storage with opaque, collision-safe naming
//! - File record metadata management
//! - The ownership boundary every read and delete goes through

mod record;
mod service;
mod storage;

pub use record::{FileKind, FileRecord, FileRepository, NewFileRecord};
pub use service::FileService;
pub use storage::FileStorage;

/// Maximum length for an original filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Default maximum size for a single stored object (5MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
