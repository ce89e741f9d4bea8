//! # Edit Session
//!
//! One author's editing state for one article: the canvas, uploads in
//! flight, and the notices shown to the author.
//!
//! Saving and publishing hand the serialized canvas to a
//! [`PersistenceBridge`]. A failed save or upload leaves the block tree
//! exactly as it was and surfaces a [`Notice`]; nothing is retried.
//!
//! An upload pins its image block on the canvas, so the URL lands on the
//! block that asked for it even if the tree is rearranged meanwhile. If that
//! block is deleted, or the canvas is reset, the URL is dropped with a notice.

use crate::article::Article;
use crate::bridge::{AssetUploader, PersistenceBridge, UploadError};
use crate::canvas::{BlockPin, Canvas, SyncOutcome};
use crate::document::Location;
use crate::render::FieldEdit;
use crate::{Block, EditorError, MutationError};
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Claim on an image slot while its upload is outstanding
#[must_use]
#[derive(Debug)]
pub struct UploadTicket {
    pin: BlockPin,
    at: Location,
}

impl UploadTicket {
    /// Where the image block was when the upload began
    pub fn location(&self) -> Location {
        self.at
    }
}

pub struct EditSession {
    article: Article,
    canvas: Canvas,
    /// Image blocks with an upload in flight
    uploads: HashSet<BlockPin>,
    notices: Vec<Notice>,
    /// Canvas version last written to the bridge
    saved_version: u64,
}

impl EditSession {
    /// Start editing; the article body is hydrated into the canvas
    pub fn new(article: Article) -> Self {
        let canvas = Canvas::mount(&article.content);
        Self {
            saved_version: canvas.version(),
            article,
            canvas,
            uploads: HashSet::new(),
            notices: Vec::new(),
        }
    }

    /// Load an article from the bridge and start editing it
    pub async fn open(bridge: &impl PersistenceBridge, id: &str) -> Result<Self, EditorError> {
        let article = bridge.load(id).await?;
        info!(id, title = %article.title, "Opened article for editing");
        Ok(Self::new(article))
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.canvas = std::mem::take(&mut self.canvas).with_undo_levels(levels);
        self
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    /// Metadata edits (title, taxonomy, flags) are saved with the next save
    pub fn article_mut(&mut self) -> &mut Article {
        &mut self.article
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.canvas.version() != self.saved_version
    }

    pub fn is_uploading(&self, at: Location) -> bool {
        self.uploads
            .iter()
            .any(|pin| self.canvas.pinned(*pin) == Some(at))
    }

    /// Current locations of image blocks with an upload in flight, for
    /// [`RenderContext::uploading`](crate::RenderContext)
    pub fn uploading_slots(&self) -> HashSet<Location> {
        self.uploads
            .iter()
            .filter_map(|pin| self.canvas.pinned(*pin))
            .collect()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Claim the image slot at `at`. Fails while another upload for the
    /// same slot is outstanding.
    pub fn begin_upload(&mut self, at: Location) -> Result<UploadTicket, EditorError> {
        match self.canvas.document().get(at) {
            Some(Block::Image(_)) => {}
            Some(other) => {
                return Err(MutationError::KindMismatch {
                    expected: crate::BlockKind::Image,
                    found: other.kind(),
                }
                .into())
            }
            None => return Err(MutationError::BlockNotFound(at).into()),
        }

        if self.is_uploading(at) {
            return Err(EditorError::UploadInFlight(at));
        }

        let pin = self
            .canvas
            .pin(at)
            .ok_or(MutationError::BlockNotFound(at))?;
        self.uploads.insert(pin);
        Ok(UploadTicket { pin, at })
    }

    /// Release the slot and, on success, point the image at the uploaded URL.
    /// Returns the URL.
    ///
    /// The URL follows the image block wherever it moved; if the block is
    /// gone the tree is left untouched and an error notice is raised.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<String, UploadError>,
    ) -> Result<String, EditorError> {
        self.uploads.remove(&ticket.pin);
        let current = self.canvas.pinned(ticket.pin);
        self.canvas.unpin(ticket.pin);
        let at = current.unwrap_or(ticket.at);

        let url = match result {
            Ok(url) => url,
            Err(err) => {
                warn!(location = %at, error = %err, "Image upload failed");
                self.notices.push(Notice::error(format!("Image upload failed: {}", err)));
                return Err(err.into());
            }
        };

        if current.is_none() {
            warn!(location = %ticket.at, "Image block removed during upload");
            self.notices.push(Notice::error(format!(
                "Could not attach uploaded image: the image block at {} was removed",
                ticket.at
            )));
            return Err(MutationError::BlockNotFound(ticket.at).into());
        }

        if let Err(err) = self.canvas.edit(at, FieldEdit::Src(url.clone())) {
            warn!(location = %at, error = %err, "Uploaded image no longer has a slot");
            self.notices
                .push(Notice::error(format!("Could not attach uploaded image: {}", err)));
            return Err(err.into());
        }

        Ok(url)
    }

    /// Upload `bytes` for the image block at `at`
    pub async fn upload_image(
        &mut self,
        at: Location,
        file_name: &str,
        bytes: &[u8],
        uploader: &impl AssetUploader,
    ) -> Result<String, EditorError> {
        let ticket = self.begin_upload(at)?;
        let result = uploader.upload(file_name, bytes).await;
        self.finish_upload(ticket, result)
    }

    /// Store the current body without changing the article's status
    pub async fn save_draft(&mut self, bridge: &impl PersistenceBridge) -> Result<(), EditorError> {
        self.persist(bridge, false).await
    }

    /// Store the current body and make the article public
    pub async fn publish(&mut self, bridge: &impl PersistenceBridge) -> Result<(), EditorError> {
        self.persist(bridge, true).await
    }

    async fn persist(&mut self, bridge: &impl PersistenceBridge, publish: bool) -> Result<(), EditorError> {
        let mut next = self.article.clone();

        next.content = match self.canvas.serialize() {
            Ok(content) => content,
            Err(err) => {
                self.notices.push(Notice::error(format!("Could not save: {}", err)));
                return Err(err);
            }
        };

        if publish && !next.is_published() {
            if let Err(err) = next.publish() {
                self.notices.push(Notice::error(format!("Could not publish: {}", err)));
                return Err(err.into());
            }
        } else {
            next.touch();
        }

        if let Err(err) = bridge.save(&next).await {
            warn!(id = %next.id, error = %err, "Saving article failed");
            self.notices.push(Notice::error(format!("Could not save: {}", err)));
            return Err(err.into());
        }

        info!(
            id = %next.id,
            status = %next.status,
            blocks = self.canvas.document().content.len(),
            "Article saved"
        );
        self.article = next;
        self.saved_version = self.canvas.version();
        self.notices.push(Notice::info(if publish {
            "Article published"
        } else {
            "Draft saved"
        }));
        Ok(())
    }

    /// Re-read the stored article and reconcile the canvas with it
    pub async fn reload(&mut self, bridge: &impl PersistenceBridge) -> Result<SyncOutcome, EditorError> {
        let stored = bridge.load(&self.article.id).await?;
        let outcome = self.canvas.sync_external(&stored.content);

        // A reset releases every pin
        let canvas = &self.canvas;
        self.uploads.retain(|pin| canvas.pinned(*pin).is_some());

        if outcome != SyncOutcome::Echo {
            self.saved_version = self.canvas.version();
        }
        self.article = stored;
        Ok(outcome)
    }
}
