mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    add, archive, image, init, list, move_block, new_article, publish, render, show, unpublish,
    validate, AddArgs, ArticleArgs, ImageArgs, InitArgs, MoveArgs, NewArgs, RenderArgs,
};
use tracing_subscriber::EnvFilter;

/// Pressroom CLI - block-based article editing from the terminal
#[derive(Parser, Debug)]
#[command(name = "pressroom")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pressroom project
    Init(InitArgs),

    /// Create a draft article
    New(NewArgs),

    /// List articles, most recently updated first
    List,

    /// Show an article's metadata and block outline
    Show(ArticleArgs),

    /// Check that an article's body is well formed
    Validate(ArticleArgs),

    /// Render an article's body to HTML
    Render(RenderArgs),

    /// Append or insert a block with default content
    Add(AddArgs),

    /// Move a top-level block
    Move(MoveArgs),

    /// Publish an article
    Publish(ArticleArgs),

    /// Return a published article to draft
    Unpublish(ArticleArgs),

    /// Archive an article
    Archive(ArticleArgs),

    /// Upload an image file into an Image block
    Image(ImageArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::New(args) => new_article(args, &cwd).await,
        Command::List => list(&cwd).await,
        Command::Show(args) => show(args, &cwd).await,
        Command::Validate(args) => validate(args, &cwd).await,
        Command::Render(args) => render(args, &cwd).await,
        Command::Add(args) => add(args, &cwd).await,
        Command::Move(args) => move_block(args, &cwd).await,
        Command::Publish(args) => publish(args, &cwd).await,
        Command::Unpublish(args) => unpublish(args, &cwd).await,
        Command::Archive(args) => archive(args, &cwd).await,
        Command::Image(args) => image(args, &cwd).await,
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
