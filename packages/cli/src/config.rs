use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pressroom.config.json";

/// Pressroom configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding article records
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Directory uploaded images are written to
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// URL prefix uploaded images are served from
    #[serde(default = "default_public_asset_base")]
    pub public_asset_base: String,

    /// Undo levels kept per editing session (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,
}

fn default_store_dir() -> String {
    "content".to_string()
}

fn default_asset_dir() -> String {
    "public/uploads".to_string()
}

fn default_public_asset_base() -> String {
    "/uploads".to_string()
}

fn default_undo_levels() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the article store
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }

    pub fn get_asset_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.asset_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            asset_dir: default_asset_dir(),
            public_asset_base: default_public_asset_base(),
            undo_levels: default_undo_levels(),
        }
    }
}
