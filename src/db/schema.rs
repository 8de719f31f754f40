//! Database schema and migrations for filevault.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - files table
    r#"
-- File records. Byte content lives in the storage directory under
-- stored_name; rows here are the only way to reach it.
CREATE TABLE files (
    id              BLOB PRIMARY KEY,
    owner_id        INTEGER NOT NULL,
    original_name   TEXT NOT NULL,
    stored_name     TEXT NOT NULL UNIQUE,
    kind            TEXT NOT NULL DEFAULT 'other',   -- 'image', 'document', 'other'
    size            INTEGER NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_files_owner ON files(owner_id);
CREATE INDEX idx_files_owner_kind ON files(owner_id, kind);
"#,
];
