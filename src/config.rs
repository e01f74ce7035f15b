//! Command line configuration.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line configuration for portaldoc.
#[derive(Debug, Clone, Parser)]
#[command(name = "portaldoc", version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
}

/// Portaldoc subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a markdown page to HTML
    Render {
        /// Markdown file to render
        input: PathBuf,

        /// JSON page list of the page scope
        #[arg(short, long)]
        pages: Option<PathBuf>,

        /// Management base URL for media links
        #[arg(long, default_value = "/management")]
        base_url: String,

        /// Base path resolved page ids are appended to
        #[arg(long, default_value = "/documentation")]
        page_base_url: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the page tree of a scope as JSON
    Tree {
        /// JSON page list of the page scope
        #[arg(short, long)]
        pages: PathBuf,

        /// Parent id of the top level (scope root when omitted)
        #[arg(long)]
        root: Option<String>,
    },
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an input file does not exist or a base URL is empty.
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Render {
                input,
                pages,
                base_url,
                page_base_url,
                ..
            } => {
                if !input.exists() {
                    bail!("Markdown file does not exist: {}", input.display());
                }
                if let Some(pages) = pages
                    && !pages.exists()
                {
                    bail!("Page list does not exist: {}", pages.display());
                }
                if base_url.trim().is_empty() {
                    bail!("Base URL must not be empty");
                }
                if page_base_url.trim().is_empty() {
                    bail!("Page base URL must not be empty");
                }
            }
            Command::Tree { pages, .. } => {
                if !pages.exists() {
                    bail!("Page list does not exist: {}", pages.display());
                }
            }
        }

        Ok(())
    }
}
