use super::open_store;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pressroom_editor::{
    unique_slug, view_document, Article, ArticleStatus, BlockView, Control, Document,
    PersistenceBridge, RenderContext,
};
use std::collections::HashSet;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Article title
    pub title: String,

    /// Category the article is filed under
    #[arg(short, long, default_value = "news")]
    pub category: String,
}

#[derive(Debug, Args)]
pub struct ArticleArgs {
    /// Article id
    pub id: String,
}

pub async fn new_article(args: NewArgs, cwd: &str) -> Result<()> {
    let (_, bridge) = open_store(cwd)?;

    let taken: HashSet<String> = bridge
        .list()
        .await?
        .into_iter()
        .map(|article| article.slug)
        .collect();

    let mut article = Article::new(&args.title, &args.category)?;
    article.slug = unique_slug(&article.slug, &taken);
    bridge.save(&article).await?;

    println!(
        "{} Created {} ({})",
        "✓".green(),
        article.title.bright_white(),
        article.id.dimmed()
    );
    println!("  slug: {}", article.slug);
    Ok(())
}

pub async fn list(cwd: &str) -> Result<()> {
    let (_, bridge) = open_store(cwd)?;
    let articles = bridge.list().await?;

    if articles.is_empty() {
        println!("{}", "No articles yet".yellow());
        return Ok(());
    }

    for article in articles {
        println!(
            "  {}  {:<9}  {}  {}",
            article.id.dimmed(),
            status_label(article.status),
            article.title.bright_white(),
            article.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
    Ok(())
}

pub async fn show(args: ArticleArgs, cwd: &str) -> Result<()> {
    let (_, bridge) = open_store(cwd)?;
    let article = bridge.load(&args.id).await?;
    let doc = Document::parse_or_empty(&article.content);

    println!("{}", article.title.bright_white().bold());
    println!("  id:       {}", article.id);
    println!("  slug:     {}", article.slug);
    println!("  category: {}", article.category);
    println!("  status:   {}", status_label(article.status));
    if let Some(published_at) = article.published_at {
        println!("  published: {}", published_at.format("%Y-%m-%d %H:%M"));
    }
    println!();

    let views = view_document(&doc, RenderContext::default());
    if views.is_empty() {
        println!("{}", "  (empty)".dimmed());
    }
    print_views(&doc, &views, 1);
    Ok(())
}

fn print_views(doc: &Document, views: &[BlockView], depth: usize) {
    for view in views {
        let summary = doc.get(view.location).map(|b| b.summary()).unwrap_or_default();
        println!(
            "{}{} {} {}",
            "  ".repeat(depth),
            format!("[{}]", view.location.index).dimmed(),
            view.label.cyan(),
            summary
        );

        for control in &view.controls {
            if let Control::DropZone { blocks, .. } = control {
                println!("{}{}", "  ".repeat(depth + 1), "column".dimmed());
                print_views(doc, blocks, depth + 2);
            }
        }
    }
}

pub async fn publish(args: ArticleArgs, cwd: &str) -> Result<()> {
    transition(args, cwd, "Published", Article::publish).await
}

pub async fn unpublish(args: ArticleArgs, cwd: &str) -> Result<()> {
    transition(args, cwd, "Unpublished", Article::unpublish).await
}

pub async fn archive(args: ArticleArgs, cwd: &str) -> Result<()> {
    transition(args, cwd, "Archived", Article::archive).await
}

async fn transition<F, E>(args: ArticleArgs, cwd: &str, done: &str, apply: F) -> Result<()>
where
    F: FnOnce(&mut Article) -> Result<(), E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let (_, bridge) = open_store(cwd)?;
    let mut article = bridge.load(&args.id).await?;

    apply(&mut article)?;
    bridge.save(&article).await?;

    println!("{} {} {}", "✓".green(), done, article.title.bright_white());
    Ok(())
}

fn status_label(status: ArticleStatus) -> colored::ColoredString {
    match status {
        ArticleStatus::Draft => status.to_string().yellow(),
        ArticleStatus::Published => status.to_string().green(),
        ArticleStatus::Archived => status.to_string().dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_articles_get_unique_slugs() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        for _ in 0..2 {
            new_article(
                NewArgs {
                    title: "Budget Vote".to_string(),
                    category: "politics".to_string(),
                },
                &cwd,
            )
            .await
            .unwrap();
        }

        let (_, bridge) = open_store(&cwd).unwrap();
        let mut slugs: Vec<String> = bridge
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.slug)
            .collect();
        slugs.sort();
        assert_eq!(slugs, vec!["budget-vote", "budget-vote-2"]);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        let (_, bridge) = open_store(&cwd).unwrap();

        let article = Article::new("Draft only", "news").unwrap();
        bridge.save(&article).await.unwrap();

        let result = unpublish(ArticleArgs { id: article.id.clone() }, &cwd).await;
        assert!(result.is_err());

        publish(ArticleArgs { id: article.id.clone() }, &cwd).await.unwrap();
        assert_eq!(
            bridge.load(&article.id).await.unwrap().status,
            ArticleStatus::Published
        );
    }
}
