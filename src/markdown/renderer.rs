//! Markdown rendering with GitHub Flavored Markdown support.

use anyhow::{Context, Result};
use comrak::nodes::{Ast, AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use super::{LinkResolver, LinkTarget};
use crate::page::Page;

/// CSS class marking links the host router should intercept.
pub const INTERNAL_LINK_CLASS: &str = "internal-link";

/// CSS class marking in-page anchor links.
pub const ANCHOR_LINK_CLASS: &str = "anchor";

/// Renders documentation markdown to HTML.
///
/// Provides GFM extensions including tables, strikethrough, autolinks,
/// task lists, footnotes, and description lists. Every link and image in
/// the document is routed through a [`LinkResolver`] before output, so
/// legacy documentation links point at concrete page ids.
pub struct MarkdownRenderer<'a> {
    options: Options<'a>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Creates renderer with GitHub Flavored Markdown options.
    ///
    /// Raw HTML is emitted as-is: link rewriting injects its anchors as
    /// inline HTML, and sanitizing the result is left to the host page.
    pub fn new() -> Self {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.description_lists = true;

        options.render.unsafe_ = true;

        Self { options }
    }

    /// Renders markdown content to HTML string.
    ///
    /// Parses markdown into AST, rewrites link and image nodes with the
    /// resolver, gives every heading a slug id, then formats the tree as
    /// HTML.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown content to render
    /// * `resolver`: Link resolver bound to the page scope
    ///
    /// # Errors
    ///
    /// Returns error if HTML formatting fails
    pub fn render(&self, content: &str, resolver: &LinkResolver<'_>) -> Result<String> {
        let arena = Arena::new();
        let root = comrak::parse_document(&arena, content, &self.options);

        rewrite_links(&arena, root, resolver);
        add_heading_ids(root, &self.options)?;

        let mut html = Vec::with_capacity(content.len() * 2);
        comrak::format_html(root, &self.options, &mut html).context("Failed to format HTML")?;

        String::from_utf8(html).context("Rendered HTML is not valid UTF8")
    }

    /// Renders markdown file at given path.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or rendering fails
    pub fn render_file(
        &self,
        path: impl AsRef<Path>,
        resolver: &LinkResolver<'_>,
    ) -> Result<String> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read markdown file")?;
        self.render(&content, resolver)
    }
}

impl<'a> Default for MarkdownRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a documentation page with a fresh renderer and resolver.
///
/// Nothing is shared between calls, so concurrent renders of different
/// scopes need no coordination.
///
/// # Arguments
///
/// * `content`: Markdown source of the page
/// * `base_url`: Management base URL used for media short links
/// * `page_base_url`: Base path resolved page ids are appended to
/// * `pages`: Page list of the scope the document belongs to
///
/// # Errors
///
/// Returns error if HTML formatting fails
pub fn render(
    content: &str,
    base_url: &str,
    page_base_url: &str,
    pages: &[Page],
) -> Result<String> {
    let resolver = LinkResolver::new(pages, base_url, page_base_url);
    MarkdownRenderer::new().render(content, &resolver)
}

fn rewrite_links<'a>(
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    resolver: &LinkResolver<'_>,
) {
    // Collect first: wrapping a link restructures the tree being walked
    let nodes: Vec<&'a AstNode<'a>> = root
        .descendants()
        .filter(|node| {
            matches!(
                node.data.borrow().value,
                NodeValue::Link(_) | NodeValue::Image(_)
            )
        })
        .collect();

    for node in nodes {
        let (is_image, url, title) = match &node.data.borrow().value {
            NodeValue::Link(link) => (false, link.url.clone(), link.title.clone()),
            NodeValue::Image(link) => (true, link.url.clone(), link.title.clone()),
            _ => continue,
        };

        if is_image {
            if let Some(short) = resolver.resolve_image(&url) {
                set_url(node, short);
            }
            continue;
        }

        match resolver.resolve_link(&url) {
            LinkTarget::Internal { url, .. } => {
                wrap_in_anchor(arena, node, INTERNAL_LINK_CLASS, &url, &title);
            }
            LinkTarget::Anchor(href) => {
                wrap_in_anchor(arena, node, ANCHOR_LINK_CLASS, &href, &title);
            }
            LinkTarget::Rewritten(url) => set_url(node, url),
            LinkTarget::Unchanged => {}
        }
    }
}

/// Renders headings with an `id` slug so `#section` anchors have a target.
///
/// Comrak headings carry no attributes, so each heading is replaced by an
/// HTML block holding its rendered content.
fn add_heading_ids<'a>(root: &'a AstNode<'a>, options: &Options<'_>) -> Result<()> {
    let headings: Vec<&'a AstNode<'a>> = root
        .descendants()
        .filter(|node| matches!(node.data.borrow().value, NodeValue::Heading(_)))
        .collect();

    let mut slugger = Slugger::default();
    for heading in headings {
        let level = match &heading.data.borrow().value {
            NodeValue::Heading(h) => h.level,
            _ => continue,
        };
        let id = slugger.slug(&plain_text(heading));

        let mut inner = Vec::new();
        for child in heading.children() {
            comrak::format_html(child, options, &mut inner)
                .context("Failed to format heading")?;
        }
        let inner = String::from_utf8(inner).context("Heading HTML is not valid UTF8")?;

        let children: Vec<&'a AstNode<'a>> = heading.children().collect();
        for child in children {
            child.detach();
        }

        heading.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: format!(
                "<h{level} id=\"{}\">{inner}</h{level}>\n",
                escape_attr(&id)
            ),
        });
    }

    Ok(())
}

/// Concatenates text and inline code below a node.
fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            NodeValue::Code(code) => text.push_str(&code.literal),
            _ => {}
        }
    }
    text
}

/// Heading slug generator, GitHub style.
///
/// Lower-cases, drops punctuation and turns each space into `-`. Repeated
/// slugs get a `-1`, `-2`, ... suffix.
#[derive(Default)]
struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base: String = text
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
            .map(|c| if c == ' ' { '-' } else { c })
            .collect();

        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

fn set_url(node: &AstNode<'_>, url: String) {
    if let NodeValue::Link(link) | NodeValue::Image(link) = &mut node.data.borrow_mut().value {
        link.url = url;
    }
}

/// Replaces a link node with a classed anchor around its children.
fn wrap_in_anchor<'a>(
    arena: &'a Arena<AstNode<'a>>,
    node: &'a AstNode<'a>,
    class: &str,
    href: &str,
    title: &str,
) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", escape_attr(title))
    };
    let open = format!(
        "<a class=\"{}\" href=\"{}\"{}>",
        class,
        escape_attr(href),
        title_attr
    );

    node.insert_before(inline_html(arena, node, open));

    let children: Vec<&'a AstNode<'a>> = node.children().collect();
    for child in children {
        child.detach();
        node.insert_before(child);
    }

    node.insert_before(inline_html(arena, node, "</a>".to_string()));
    node.detach();
}

fn inline_html<'a>(
    arena: &'a Arena<AstNode<'a>>,
    anchor: &'a AstNode<'a>,
    html: String,
) -> &'a AstNode<'a> {
    let start = anchor.data.borrow().sourcepos.start;
    arena.alloc(AstNode::new(RefCell::new(Ast::new(
        NodeValue::HtmlInline(html),
        start,
    ))))
}

/// Escapes HTML special characters for attribute values.
fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageType;

    fn scope_pages() -> Vec<Page> {
        vec![
            Page::new("parent-id", "parent", PageType::Folder),
            Page::new("44", "myPage", PageType::Markdown).with_parent("parent-id"),
            Page::new("spec-id", "Petstore", PageType::Swagger),
        ]
    }

    #[test]
    fn test_render_basic_markdown() {
        // Arrange
        let markdown = "# Hello\n\nThis is **bold** text.";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render markdown");

        // Assert
        assert!(
            html.contains(r#"<h1 id="hello">Hello</h1>"#),
            "Heading should carry slug id: {}",
            html
        );
        assert!(html.contains("<strong>bold</strong>"), "Should contain bold");
    }

    #[test]
    fn test_render_gfm_tables() {
        // Arrange
        let markdown = r#"
| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |
"#;

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render table");

        // Assert
        assert!(html.contains("<table>"), "Should contain table tag");
        assert!(html.contains("<th>"), "Should contain table header");
        assert!(html.contains("Cell 1"), "Should contain cell text");
    }

    #[test]
    fn test_render_relative_link_to_page_id() {
        // Arrange
        let pages = scope_pages();
        let markdown = "[text](/#!/documentation/api/parent/myPage#MARKDOWN)";

        // Act
        let html = render(markdown, "/mgmt", "/apis/api-1/docs", &pages).expect("Should render");

        // Assert
        assert!(
            html.contains(r#"<a class="internal-link" href="/apis/api-1/docs/44">text</a>"#),
            "Should link resolved page id: {}",
            html
        );
    }

    #[test]
    fn test_render_unresolved_link_falls_back() {
        // Arrange
        let pages = scope_pages();
        let markdown = "[text](/#!/documentation/api/doesNotExist#MARKDOWN)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &pages).expect("Should render");

        // Assert
        assert!(
            html.contains(r#"<a class="internal-link" href="/docs/doesNotExist">text</a>"#),
            "Should link literal last segment: {}",
            html
        );
    }

    #[test]
    fn test_render_keeps_link_children_and_title() {
        // Arrange
        let pages = scope_pages();
        let markdown = r#"See [the **pet** spec](/#!/documentation/api/petstore#OPENAPI "Pet & co") now."#;

        // Act
        let html = render(markdown, "/mgmt", "/docs", &pages).expect("Should render");

        // Assert
        assert!(
            html.contains(
                r#"<a class="internal-link" href="/docs/spec-id" title="Pet &amp; co">the <strong>pet</strong> spec</a> now."#
            ),
            "Should wrap formatted children: {}",
            html
        );
    }

    #[test]
    fn test_render_anchor_link_has_heading_target() {
        // Arrange
        let markdown = "# Install\n\n[Jump](#install)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(html.contains(r#"<h1 id="install">Install</h1>"#), "{}", html);
        assert!(html.contains(r##"<a class="anchor" href="#install">Jump</a>"##), "{}", html);
    }

    #[test]
    fn test_render_heading_slugs() {
        // Arrange
        let markdown = "\
# Heading with @#$%^&*() characters

## Hello `World`

## Hello World

### See [Petstore](/#!/documentation/api/petstore#SWAGGER)
";
        let pages = scope_pages();

        // Act
        let html = render(markdown, "/mgmt", "/docs", &pages).expect("Should render");

        // Assert
        assert!(
            html.contains(r#"<h1 id="heading-with--characters">Heading with @#$%^&amp;*() characters</h1>"#),
            "Punctuation should be dropped from slug: {}",
            html
        );
        assert!(
            html.contains(r#"<h2 id="hello-world">Hello <code>World</code></h2>"#),
            "Inline code counts toward slug: {}",
            html
        );
        assert!(
            html.contains(r#"<h2 id="hello-world-1">Hello World</h2>"#),
            "Repeated slug should get a suffix: {}",
            html
        );
        assert!(
            html.contains(r#"<h3 id="see-petstore">See <a class="internal-link" href="/docs/spec-id">Petstore</a></h3>"#),
            "Links inside headings are still rewritten: {}",
            html
        );
    }

    #[test]
    fn test_render_keeps_straight_punctuation() {
        // Arrange
        let markdown = r#"Use "quotes" -- it's"#;

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(
            html.contains("<p>Use &quot;quotes&quot; -- it's</p>"),
            "Text should not be typographically rewritten: {}",
            html
        );
    }

    #[test]
    fn test_render_anchor_link() {
        // Arrange
        let markdown = "[Jump](#install)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(
            html.contains(r##"<a class="anchor" href="#install">Jump</a>"##),
            "Should mark anchor link: {}",
            html
        );
    }

    #[test]
    fn test_render_strips_hash_route_prefix() {
        // Arrange
        let markdown = "[Plans](/#!/apis/123/plans)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(
            html.contains(r#"<a href="/apis/123/plans">Plans</a>"#),
            "Should render default link with stripped prefix: {}",
            html
        );
    }

    #[test]
    fn test_render_external_link_unchanged() {
        // Arrange
        let markdown = "[Site](https://example.com/page)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(
            html.contains(r#"<a href="https://example.com/page">Site</a>"#),
            "Should pass link through: {}",
            html
        );
        assert!(!html.contains("internal-link"));
    }

    #[test]
    fn test_render_media_image() {
        // Arrange
        let markdown =
            "![diagram](https://old.host/management/environments/DEFAULT/apis/a1/media/h42)";

        // Act
        let html = render(markdown, "https://apim.local/management", "/docs", &[])
            .expect("Should render");

        // Assert
        assert!(
            html.contains(r#"src="https://apim.local/management/apis/a1/media/h42""#),
            "Should shorten media URL: {}",
            html
        );
        assert!(html.contains(r#"alt="diagram""#), "Should keep alt text");
    }

    #[test]
    fn test_render_plain_image_unchanged() {
        // Arrange
        let markdown = "![logo](https://cdn.example.com/logo.png)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(html.contains(r#"src="https://cdn.example.com/logo.png""#));
    }

    #[test]
    fn test_render_image_inside_internal_link() {
        // Arrange
        let markdown = "[![badge](/environments/DEFAULT/portal/media/b1)](/#!/settings/pages/p9)";

        // Act
        let html = render(markdown, "/mgmt", "/docs", &[]).expect("Should render");

        // Assert
        assert!(
            html.contains(r#"<a class="internal-link" href="/docs/p9"><img src="/mgmt/portal/media/b1""#),
            "Should rewrite both link and nested image: {}",
            html
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        // Arrange
        let pages = scope_pages();
        let markdown = "- [a](/#!/documentation/api/parent/myPage#MARKDOWN)\n- [b](#top)\n";

        // Act
        let first = render(markdown, "/mgmt", "/docs", &pages).expect("Should render");
        let second = render(markdown, "/mgmt", "/docs", &pages).expect("Should render");

        // Assert
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_file_missing() {
        // Arrange
        let renderer = MarkdownRenderer::new();
        let resolver = LinkResolver::new(&[], "/mgmt", "/docs");

        // Act
        let result = renderer.render_file("missing/page.md", &resolver);

        // Assert
        assert!(result.is_err(), "Missing file should fail");
    }

    #[test]
    fn test_escape_attr() {
        // Assert
        assert_eq!(escape_attr(r#"a"b<c>&'"#), "a&quot;b&lt;c&gt;&amp;&#39;");
    }
}
