//! Link resolution for legacy documentation references.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::page::{Page, PageType};

/// Hash-route prefix used by the legacy portal for every internal URL.
const LEGACY_PREFIX: &str = "/#!";

/// Legacy href shapes that name a documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegacyShape {
    /// `/#!/settings/pages/<pageId>`
    SettingsPage,
    /// `/#!/apis/<apiId>/documentation/<pageId>`
    ApiPage,
    /// `/#!/documentation/(api|environment)/<path>#<TYPE>`
    RelativePath,
}

struct Rule {
    pattern: Regex,
    shape: LegacyShape,
}

/// Ordered dispatch table, first match wins.
fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                r"^/#!/settings/pages/([^/?#]+)(?:$|[?#])",
                LegacyShape::SettingsPage,
            ),
            (
                r"^/#!/apis/[^/?#]+/documentation/([^/?#]+)(?:$|[?#])",
                LegacyShape::ApiPage,
            ),
            (
                r"^/#!/documentation/(?:api|environment)/([^#]+)#(MARKDOWN|SWAGGER|OPENAPI|ASYNCAPI|ASCIIDOC)$",
                LegacyShape::RelativePath,
            ),
        ]
        .into_iter()
        .map(|(pattern, shape)| Rule {
            pattern: Regex::new(pattern).expect("legacy link pattern should compile"),
            shape,
        })
        .collect()
    })
}

fn api_media_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/apis/([\w-]+)/media/([\w-]+)").expect("api media pattern should compile")
    })
}

fn portal_media_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/portal/media/([\w-]+)").expect("portal media pattern should compile")
    })
}

/// Outcome of resolving a link href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// In-page anchor (`#section`), href kept as is.
    Anchor(String),
    /// Documentation page of the current scope.
    Internal { page_id: String, url: String },
    /// Unrecognized hash-route link with its `/#!` prefix stripped.
    Rewritten(String),
    /// Any other link, left for default rendering.
    Unchanged,
}

/// Resolves legacy documentation links against one scope's page list.
///
/// Borrows the page list for the duration of a render call. Resolution is
/// pure: no I/O, no interior state, same input gives same output.
pub struct LinkResolver<'p> {
    pages: &'p [Page],
    base_url: String,
    page_base_url: String,
}

impl<'p> LinkResolver<'p> {
    /// Creates resolver for a page scope.
    ///
    /// # Arguments
    ///
    /// * `pages`: Flat page list of the scope (one API or one portal)
    /// * `base_url`: Management base URL used for media short links
    /// * `page_base_url`: Base path that page ids are appended to
    pub fn new(pages: &'p [Page], base_url: &str, page_base_url: &str) -> Self {
        Self {
            pages,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_base_url: page_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Classifies and resolves a link href.
    ///
    /// Handles different link kinds:
    /// - Anchors (#section) stay unchanged and are marked as anchors
    /// - Settings and API page links use the embedded page id directly
    /// - Relative documentation paths are walked by page name
    /// - Other hash-route links lose their `/#!` prefix
    /// - Everything else is left alone
    pub fn resolve_link(&self, href: &str) -> LinkTarget {
        if href.starts_with('#') {
            return LinkTarget::Anchor(href.to_string());
        }

        if !href.starts_with("/#!/") {
            return LinkTarget::Unchanged;
        }

        for rule in rules() {
            let Some(caps) = rule.pattern.captures(href) else {
                continue;
            };

            let page_id = match rule.shape {
                LegacyShape::SettingsPage | LegacyShape::ApiPage => caps[1].to_string(),
                LegacyShape::RelativePath => {
                    let path = &caps[1];
                    let resolved = PageType::from_link_token(&caps[2])
                        .and_then(|page_type| self.find_page_id(path, page_type));

                    match resolved {
                        Some(id) => id.to_string(),
                        None => {
                            warn!(href, "Unresolved documentation link, using last segment");
                            last_segment(path).to_string()
                        }
                    }
                }
            };

            debug!(href, page_id = %page_id, shape = ?rule.shape, "Resolved page link");
            let url = format!("{}/{}", self.page_base_url, page_id);
            return LinkTarget::Internal { page_id, url };
        }

        let rewritten = &href[LEGACY_PREFIX.len()..];
        debug!(href, rewritten, "Stripped hash-route prefix");
        LinkTarget::Rewritten(rewritten.to_string())
    }

    /// Finds page id for a `/`-separated path of page names.
    ///
    /// Every segment but the last must name a folder under the previous
    /// one, starting at the scope root. The last segment must name a page of
    /// `page_type` under the final folder. Names compare case-insensitively.
    ///
    /// # Arguments
    ///
    /// * `path`: Percent-encoded path of page names
    /// * `page_type`: Expected type of the target page
    ///
    /// # Returns
    ///
    /// Id of the matching page, `None` if any segment fails to match
    pub fn find_page_id(&self, path: &str, page_type: PageType) -> Option<&'p str> {
        let decoded = urlencoding::decode(path).ok()?;
        let segments: Vec<&str> = decoded.split('/').collect();
        let (last, folders) = segments.split_last()?;

        let mut parent: Option<&'p str> = None;
        for segment in folders {
            let folder = self.find_child(parent, segment, PageType::Folder)?;
            parent = Some(folder.id.as_str());
        }

        self.find_child(parent, last, page_type)
            .map(|page| page.id.as_str())
    }

    /// Rewrites portal and API media sources to their short form.
    ///
    /// Returns `None` when the source is not a media URL.
    pub fn resolve_image(&self, src: &str) -> Option<String> {
        if let Some(caps) = api_media_pattern().captures(src) {
            return Some(format!(
                "{}/apis/{}/media/{}",
                self.base_url, &caps[1], &caps[2]
            ));
        }

        portal_media_pattern()
            .captures(src)
            .map(|caps| format!("{}/portal/media/{}", self.base_url, &caps[1]))
    }

    fn find_child(
        &self,
        parent: Option<&str>,
        name: &str,
        page_type: PageType,
    ) -> Option<&'p Page> {
        self.pages.iter().find(|page| {
            page.page_type == page_type && page.parent_id() == parent && page.name_matches(name)
        })
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
