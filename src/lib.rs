//! Documentation page rendering for API management portals.

mod config;
mod markdown;
mod page;
mod tree;

pub use config::{Command, Config};
pub use markdown::{
    ANCHOR_LINK_CLASS, INTERNAL_LINK_CLASS, LinkResolver, LinkTarget, MarkdownRenderer, render,
};
pub use page::{Page, PageType};
pub use tree::{PageTreeNode, map_to_page_tree_node};
