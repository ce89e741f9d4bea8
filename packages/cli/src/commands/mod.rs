pub mod article;
pub mod edit;
pub mod init;
pub mod render;

pub use article::{archive, list, new_article, publish, show, unpublish, ArticleArgs, NewArgs};
pub use edit::{add, image, move_block, AddArgs, ImageArgs, MoveArgs};
pub use init::{init, InitArgs};
pub use render::{render, validate, RenderArgs};

use crate::config::Config;
use pressroom_editor::FileBridge;
use tracing::debug;

/// Open the article store configured for `cwd`
pub(crate) fn open_store(cwd: &str) -> anyhow::Result<(Config, FileBridge)> {
    let config = Config::load(cwd)?;
    let bridge = FileBridge::new(config.get_store_dir(cwd));
    debug!(store = %bridge.dir().display(), "Opened article store");
    Ok((config, bridge))
}
