use super::open_store;
use super::ArticleArgs;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pressroom_editor::html::{render_html_with, HtmlOptions};
use pressroom_editor::{Document, PersistenceBridge};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Article id
    pub id: String,

    /// Write the markup to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Emit markup on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Check that the stored body parses and satisfies the block rules
pub async fn validate(args: ArticleArgs, cwd: &str) -> Result<()> {
    let (_, bridge) = open_store(cwd)?;
    let article = bridge.load(&args.id).await?;

    if article.content.trim().is_empty() {
        println!("{} {} has no content yet", "✓".green(), article.id);
        return Ok(());
    }

    let doc = Document::parse(&article.content)
        .map_err(|err| anyhow!("{} has invalid content: {}", article.id, err))?;

    println!(
        "{} {} is valid ({} blocks, {} top-level)",
        "✓".green(),
        article.id,
        doc.block_count(),
        doc.content.len()
    );
    Ok(())
}

pub async fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let (_, bridge) = open_store(cwd)?;
    let article = bridge.load(&args.id).await?;
    let doc = Document::parse_or_empty(&article.content);

    let options = HtmlOptions {
        pretty: !args.compact,
        ..HtmlOptions::default()
    };
    let html = render_html_with(&doc, &options);

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &html)?;
            println!("  {} {} → {}", "✓".green(), article.id, path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}
