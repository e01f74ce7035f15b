//! Documentation page records shared by the link resolver and tree builder.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Content kind of a documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageType {
    Markdown,
    Asciidoc,
    Swagger,
    AsyncApi,
    Folder,
    Root,
    Link,
    /// Any type this crate does not know, such as `SYSTEM_FOLDER`.
    #[serde(other)]
    Other,
}

impl PageType {
    /// Parses the type suffix of a legacy relative documentation link.
    ///
    /// Accepts MARKDOWN, SWAGGER, OPENAPI, ASYNCAPI and ASCIIDOC. OPENAPI is
    /// an alias for SWAGGER. Container types (FOLDER, ROOT, LINK) are never
    /// link targets and yield `None`, as does any unknown token.
    pub fn from_link_token(token: &str) -> Option<Self> {
        match token {
            "MARKDOWN" => Some(Self::Markdown),
            "SWAGGER" | "OPENAPI" => Some(Self::Swagger),
            "ASYNCAPI" => Some(Self::AsyncApi),
            "ASCIIDOC" => Some(Self::Asciidoc),
            _ => None,
        }
    }

    /// Returns the upper-case wire token for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "MARKDOWN",
            Self::Asciidoc => "ASCIIDOC",
            Self::Swagger => "SWAGGER",
            Self::AsyncApi => "ASYNCAPI",
            Self::Folder => "FOLDER",
            Self::Root => "ROOT",
            Self::Link => "LINK",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documentation entry of an API or portal scope.
///
/// Pages form a folder-like hierarchy through `parent`, which holds the id of
/// another page in the same scope. A missing parent places the page at the
/// root of its scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PageRecord")]
pub struct Page {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub order: i64,
}

/// Wire shape of a page; portal exports use `parentId`, older ones `parent`.
#[derive(Deserialize)]
struct PageRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    page_type: PageType,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default, rename = "parentId")]
    parent_id: Option<String>,
    #[serde(default)]
    order: i64,
}

impl From<PageRecord> for Page {
    fn from(record: PageRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            page_type: record.page_type,
            parent: record.parent_id.or(record.parent),
            order: record.order,
        }
    }
}

impl Page {
    /// Creates a root-level page with order 0.
    pub fn new(id: impl Into<String>, name: impl Into<String>, page_type: PageType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            page_type,
            parent: None,
            order: 0,
        }
    }

    /// Sets the parent page id.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the display order.
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Returns parent id, `None` for root-level pages.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Compares page name against a path segment ignoring case.
    pub fn name_matches(&self, segment: &str) -> bool {
        self.name.to_lowercase() == segment.to_lowercase()
    }

    /// Parses a JSON array of pages.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a JSON array of page objects.
    pub fn parse_all(json: &str) -> Result<Vec<Page>> {
        serde_json::from_str(json).context("Failed to parse page list")
    }

    /// Reads a JSON array of pages from disk.
    ///
    /// # Arguments
    ///
    /// * `path`: Path to a JSON file holding the scope's page list
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a page list.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Page>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page list: {}", path.display()))?;
        Self::parse_all(&json).with_context(|| format!("Invalid page list: {}", path.display()))
    }
}
