use super::open_store;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pressroom_editor::{BlockKind, EditSession, FileBridge, LocalAssetStore, Location};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Article id
    pub id: String,

    /// Block kind (heading, paragraph, rich-text, image, columns)
    pub kind: BlockKind,

    /// Insert at this canvas index instead of appending
    #[arg(long)]
    pub at: Option<usize>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Article id
    pub id: String,

    /// Current canvas index
    pub from: usize,

    /// Target canvas index
    pub to: usize,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Article id
    pub id: String,

    /// Canvas index of the Image block
    pub index: usize,

    /// Image file to upload
    pub file: PathBuf,
}

async fn open_session(id: &str, cwd: &str) -> Result<(EditSession, FileBridge, Config)> {
    let (config, bridge) = open_store(cwd)?;
    let session = EditSession::open(&bridge, id)
        .await?
        .with_undo_levels(config.undo_levels);
    Ok((session, bridge, config))
}

pub async fn add(args: AddArgs, cwd: &str) -> Result<()> {
    let (mut session, bridge, _) = open_session(&args.id, cwd).await?;

    let index = match args.at {
        Some(index) => {
            session
                .canvas_mut()
                .insert_block(Location::canvas(index), args.kind)?;
            index
        }
        None => session.canvas_mut().add_block(args.kind)?,
    };

    session.save_draft(&bridge).await?;
    println!(
        "{} Added {} at {}",
        "✓".green(),
        args.kind.label().cyan(),
        index
    );
    Ok(())
}

pub async fn move_block(args: MoveArgs, cwd: &str) -> Result<()> {
    let (mut session, bridge, _) = open_session(&args.id, cwd).await?;

    let len = session.canvas().document().content.len();
    if args.from >= len || args.to >= len {
        return Err(anyhow!(
            "Cannot move {} to {}: article has {} blocks",
            args.from,
            args.to,
            len
        ));
    }

    session.canvas_mut().move_block(args.from, args.to)?;
    if !session.has_unsaved_changes() {
        println!("{}", "Nothing to move".yellow());
        return Ok(());
    }

    session.save_draft(&bridge).await?;
    println!("{} Moved block {} to {}", "✓".green(), args.from, args.to);
    Ok(())
}

pub async fn image(args: ImageArgs, cwd: &str) -> Result<()> {
    let (mut session, bridge, config) = open_session(&args.id, cwd).await?;
    let at = Location::canvas(args.index);

    match session.canvas().document().get(at) {
        Some(block) if block.kind() == BlockKind::Image => {}
        Some(block) => return Err(anyhow!("Block {} is a {}, not an image", args.index, block.kind())),
        None => return Err(anyhow!("No block at {}", args.index)),
    }

    let uploads = LocalAssetStore::new(config.get_asset_dir(cwd), config.public_asset_base);

    let bytes = tokio::fs::read(&args.file).await?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let url = session.upload_image(at, &file_name, &bytes, &uploads).await?;
    session.save_draft(&bridge).await?;

    println!("{} Uploaded {} → {}", "✓".green(), file_name, url.bright_white());
    Ok(())
}
