//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid document content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Article error: {0}")]
    Article(#[from] crate::article::ArticleError),

    #[error("Storage error: {0}")]
    Bridge(#[from] crate::bridge::BridgeError),

    #[error("Upload failed: {0}")]
    Upload(#[from] crate::bridge::UploadError),

    #[error("An upload is already in progress for {0}")]
    UploadInFlight(crate::document::Location),
}
