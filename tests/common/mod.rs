//! Common test utilities for integration tests

use std::path::PathBuf;
use tempfile::TempDir;

use procopts::adapters::sqlite::{create_migrated_test_pool, SqliteIssueChangeRepository};

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Path of a `jvm.options` file inside a fresh temporary directory
#[allow(dead_code)]
pub fn temp_options_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("conf").join("jvm.options");
    (dir, path)
}

/// Repository over an in-memory database with all migrations applied
#[allow(dead_code)]
pub async fn test_repository() -> SqliteIssueChangeRepository {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test database");
    SqliteIssueChangeRepository::new(pool)
}
