//! filevault - self-hosted user-scoped file storage service.
//!
//! Files are uploaded over HTTP, stored on local disk under opaque names,
//! and tracked in a SQLite metadata store. Every read and delete is scoped
//! to the authenticated owner.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, VaultError};
pub use file::{FileKind, FileRecord, FileService, FileStorage};
pub use web::WebServer;
