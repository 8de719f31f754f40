//! API handlers.

pub mod files;

use crate::file::FileService;

/// Shared application state for handlers.
///
/// Wired by explicit construction: the web layer holds the file service,
/// which in turn holds the database handle and storage backend.
pub struct AppState {
    /// File access service.
    pub files: FileService,
}

impl AppState {
    /// Create a new application state.
    pub fn new(files: FileService) -> Self {
        Self { files }
    }
}
