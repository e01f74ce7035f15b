//! Shared test utilities for integration tests.
//!
//! Provides a documentation scope fixture and helpers writing it to
//! temporary files for tests that go through the file system.

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Page list of a small API documentation scope.
///
/// Layout:
///
/// ```text
/// Home (MARKDOWN)
/// parent (FOLDER)
///   myPage (MARKDOWN, id 44)
///   Reference (FOLDER)
///     Petstore API (SWAGGER)
/// Orphan (MARKDOWN, dangling parent)
/// ```
pub const SCOPE_PAGES: &str = r#"[
    {"id": "home", "name": "Home", "type": "MARKDOWN", "order": 0},
    {"id": "parent-id", "name": "parent", "type": "FOLDER", "order": 1},
    {"id": "44", "name": "myPage", "type": "MARKDOWN", "parentId": "parent-id", "order": 0},
    {"id": "ref-id", "name": "Reference", "type": "FOLDER", "parentId": "parent-id", "order": 1},
    {"id": "petstore", "name": "Petstore API", "type": "SWAGGER", "parentId": "ref-id", "order": 0},
    {"id": "orphan", "name": "Orphan", "type": "MARKDOWN", "parentId": "missing", "order": 0}
]"#;

/// Writes the scope fixture and a markdown page into a temporary directory.
///
/// # Returns
///
/// Temporary directory with paths of the page list and markdown file
///
/// # Errors
///
/// Returns error if directory creation or file writes fail
pub fn create_scope(markdown: &str) -> Result<(TempDir, PathBuf, PathBuf)> {
    let dir = TempDir::new()?;
    let pages_path = dir.path().join("pages.json");
    let markdown_path = dir.path().join("page.md");

    fs::write(&pages_path, SCOPE_PAGES)?;
    fs::write(&markdown_path, markdown)?;

    Ok((dir, pages_path, markdown_path))
}
