//! Nested page tree for documentation navigation.
//!
//! Flattened page lists reference their parent by id. This module groups
//! them by parent once and then builds the ordered tree under a given root.

use crate::page::Page;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One entry of the documentation navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageTreeNode {
    pub id: String,
    pub name: String,
    pub children: Vec<PageTreeNode>,
}

/// Builds the page tree below `root_id`.
///
/// Children at every level are sorted by `order`; pages sharing an order
/// keep their list order. Pages whose parent chain never reaches `root_id`
/// are left out rather than hoisted to the top level.
///
/// # Arguments
///
/// * `root_id`: Parent id of the top level, `None` for the scope root
/// * `pages`: Flat page list of the scope
///
/// # Returns
///
/// Ordered top-level nodes with their nested children
///
/// # Examples
///
/// ```
/// use portaldoc::{Page, PageType, map_to_page_tree_node};
///
/// let pages = vec![
///     Page::new("guides", "Guides", PageType::Folder),
///     Page::new("intro", "Intro", PageType::Markdown).with_parent("guides"),
/// ];
/// let tree = map_to_page_tree_node(None, &pages);
///
/// assert_eq!(tree[0].id, "guides");
/// assert_eq!(tree[0].children[0].id, "intro");
/// ```
pub fn map_to_page_tree_node(root_id: Option<&str>, pages: &[Page]) -> Vec<PageTreeNode> {
    let mut by_parent: HashMap<Option<&str>, Vec<&Page>> = HashMap::new();
    for page in pages {
        by_parent.entry(page.parent_id()).or_default().push(page);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|page| page.order);
    }

    let mut path: HashSet<&str> = root_id.into_iter().collect();
    build_level(root_id, &by_parent, &mut path)
}

fn build_level<'p>(
    parent: Option<&'p str>,
    by_parent: &HashMap<Option<&'p str>, Vec<&'p Page>>,
    path: &mut HashSet<&'p str>,
) -> Vec<PageTreeNode> {
    let Some(siblings) = by_parent.get(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(siblings.len());
    for page in siblings {
        // Parent cycles would otherwise recurse forever
        if !path.insert(page.id.as_str()) {
            continue;
        }
        let children = build_level(Some(page.id.as_str()), by_parent, path);
        path.remove(page.id.as_str());

        nodes.push(PageTreeNode {
            id: page.id.clone(),
            name: page.name.clone(),
            children,
        });
    }
    nodes
}
