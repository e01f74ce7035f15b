use anyhow::{Context, Result};
use portaldoc::{Command, Config, LinkResolver, MarkdownRenderer, Page};
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Loads the scope's page list, empty when no list is given.
fn load_pages(path: Option<&Path>) -> Result<Vec<Page>> {
    match path {
        Some(path) => Page::load_all(path),
        None => Ok(Vec::new()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    match config.command {
        Command::Render {
            input,
            pages,
            base_url,
            page_base_url,
            output,
        } => {
            let pages = load_pages(pages.as_deref())?;
            info!(input = %input.display(), pages = pages.len(), "Rendering page");

            let resolver = LinkResolver::new(&pages, &base_url, &page_base_url);
            let html = MarkdownRenderer::new()
                .render_file(&input, &resolver)
                .with_context(|| format!("Failed to render {}", input.display()))?;

            match output {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(output = %path.display(), "Generated page");
                }
                None => print!("{}", html),
            }
        }
        Command::Tree { pages, root } => {
            let pages = Page::load_all(&pages)?;
            let tree = portaldoc::map_to_page_tree_node(root.as_deref(), &pages);
            let json = serde_json::to_string_pretty(&tree).context("Failed to serialize tree")?;
            println!("{}", json);
        }
    }

    Ok(())
}
