//! # External Collaborators
//!
//! Contracts the editor hands its work to:
//!
//! - [`PersistenceBridge`]: stores and retrieves article records (the
//!   document travels inside as an opaque string)
//! - [`AssetUploader`]: turns uploaded image bytes into a displayable URL
//!
//! Storage backends:
//! - **Memory**: for tests and previews
//! - **File**: one pretty-printed JSON file per article

use crate::article::Article;
use std::collections::HashMap;
#[cfg(feature = "fs")]
use crc32fast::Hasher;
#[cfg(feature = "fs")]
use std::io::ErrorKind;
#[cfg(feature = "fs")]
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
#[cfg(feature = "fs")]
use tracing::{info, warn};

/// Extensions accepted by image uploads
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "avif", "svg"];

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Invalid article id: {0:?}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt article record: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload is empty")]
    Empty,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Rejected(String),
}

/// Save/load contract for article records
#[allow(async_fn_in_trait)]
pub trait PersistenceBridge {
    async fn load(&self, id: &str) -> Result<Article, BridgeError>;

    async fn save(&self, article: &Article) -> Result<(), BridgeError>;

    /// All stored articles, most recently updated first
    async fn list(&self) -> Result<Vec<Article>, BridgeError>;
}

/// Upload contract for image blocks
#[allow(async_fn_in_trait)]
pub trait AssetUploader {
    /// Store `bytes` and return the URL to display them from
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError>;
}

/// In-memory article store
#[derive(Debug, Default)]
pub struct MemoryBridge {
    articles: RwLock<HashMap<String, Article>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }
}

impl PersistenceBridge for MemoryBridge {
    async fn load(&self, id: &str) -> Result<Article, BridgeError> {
        self.articles
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(id.to_string()))
    }

    async fn save(&self, article: &Article) -> Result<(), BridgeError> {
        self.articles
            .write()
            .await
            .insert(article.id.clone(), article.clone());
        debug!(id = %article.id, "Stored article in memory");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Article>, BridgeError> {
        let mut articles: Vec<Article> = self.articles.read().await.values().cloned().collect();
        sort_recent_first(&mut articles);
        Ok(articles)
    }
}

/// Directory of `<id>.json` article files
#[cfg(feature = "fs")]
#[derive(Debug, Clone)]
pub struct FileBridge {
    dir: PathBuf,
}

#[cfg(feature = "fs")]
impl FileBridge {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, BridgeError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BridgeError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[cfg(feature = "fs")]
impl PersistenceBridge for FileBridge {
    async fn load(&self, id: &str) -> Result<Article, BridgeError> {
        let path = self.path_for(id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BridgeError::NotFound(id.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        debug!(path = %path.display(), "Loaded article");
        Ok(serde_json::from_str(&raw)?)
    }

    async fn save(&self, article: &Article) -> Result<(), BridgeError> {
        let path = self.path_for(&article.id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_string_pretty(article)?;
        tokio::fs::write(&path, json).await?;

        info!(id = %article.id, path = %path.display(), "Saved article");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Article>, BridgeError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut articles: Vec<Article> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let raw = tokio::fs::read_to_string(&path).await?;
                match serde_json::from_str(&raw) {
                    Ok(article) => articles.push(article),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "Skipping unreadable article file");
                    }
                }
            }
        }

        sort_recent_first(&mut articles);
        Ok(articles)
    }
}

fn sort_recent_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

/// Content-addressed image files served from a public base URL
#[cfg(feature = "fs")]
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    dir: PathBuf,
    public_base: String,
}

#[cfg(feature = "fs")]
impl LocalAssetStore {
    pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base: public_base.into(),
        }
    }

    /// Stored file name: CRC32 of the content plus the original extension
    pub fn file_name_for(file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| UploadError::UnsupportedType(file_name.to_string()))?;

        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedType(extension));
        }

        let mut hasher = Hasher::new();
        hasher.update(bytes);
        Ok(format!("{:08x}.{}", hasher.finalize(), extension))
    }
}

#[cfg(feature = "fs")]
impl AssetUploader for LocalAssetStore {
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let stored = Self::file_name_for(file_name, bytes)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&stored), bytes).await?;

        let url = format!("{}/{}", self.public_base.trim_end_matches('/'), stored);
        info!(file = file_name, url = %url, size = bytes.len(), "Stored upload");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_bridge_round_trip() {
        let bridge = MemoryBridge::new();
        let article = Article::new("Hello", "news").unwrap();

        bridge.save(&article).await.unwrap();
        assert_eq!(bridge.load(&article.id).await.unwrap(), article);
        assert_eq!(bridge.len().await, 1);

        assert!(matches!(
            bridge.load("missing").await,
            Err(BridgeError::NotFound(_))
        ));
    }

    #[cfg(feature = "fs")]
    #[test]
    fn test_file_bridge_rejects_path_like_ids() {
        let bridge = FileBridge::new("store");
        assert!(matches!(bridge.path_for("../etc/passwd"), Err(BridgeError::InvalidId(_))));
        assert!(matches!(bridge.path_for(""), Err(BridgeError::InvalidId(_))));
        assert!(bridge.path_for("abc-123").is_ok());
    }

    #[cfg(feature = "fs")]
    #[tokio::test]
    async fn test_file_bridge_list_skips_foreign_json() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = FileBridge::new(dir.path());

        let article = Article::new("Kept", "news").unwrap();
        bridge.save(&article).await.unwrap();
        std::fs::write(dir.path().join("notes.json"), r#"{"hello": 1}"#).unwrap();

        let listed = bridge.list().await.unwrap();
        assert_eq!(listed, vec![article]);
    }

    #[cfg(feature = "fs")]
    #[test]
    fn test_asset_file_names() {
        let a = LocalAssetStore::file_name_for("Photo.JPG", b"abc").unwrap();
        let b = LocalAssetStore::file_name_for("other.jpg", b"abc").unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with(".jpg"));

        assert!(matches!(
            LocalAssetStore::file_name_for("script.exe", b"abc"),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(LocalAssetStore::file_name_for("noext", b"abc").is_err());
    }
}
