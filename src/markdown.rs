//! Markdown rendering with documentation link resolution.
//!
//! This module renders documentation pages using comrak with GFM extensions
//! (tables, strikethrough, autolinks, task lists) and rewrites legacy
//! hash-route documentation links into links that name concrete page ids.

mod links;
mod renderer;

pub use links::{LinkResolver, LinkTarget};
pub use renderer::{ANCHOR_LINK_CLASS, INTERNAL_LINK_CLASS, MarkdownRenderer, render};
