//! # Pressroom Editor
//!
//! Block-based article editing for Pressroom.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ palette / blocks: drag payloads             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ dnd: DragContext resolves the drop slot     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ canvas: block tree + history + on_change    │
//! │  - Local mutations notify                   │
//! │  - External resyncs reconcile silently      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: uploads, save/publish via bridge   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pressroom_editor::{BlockKind, Canvas, FieldEdit, Location};
//!
//! let mut canvas = Canvas::new();
//! canvas.on_change(|doc| println!("{} blocks", doc.content.len()));
//!
//! let index = canvas.add_block(BlockKind::Heading)?;
//! canvas.edit(Location::canvas(index), FieldEdit::Text("Hello".into()))?;
//!
//! let stored = canvas.serialize()?;
//! ```

pub mod article;
pub mod block;
pub mod bridge;
mod canvas;
pub mod dnd;
mod document;
mod errors;
pub mod html;
mod mutations;
pub mod render;
mod session;
mod undo_stack;

pub use article::{slugify, unique_slug, Article, ArticleError, ArticleStatus};
pub use block::{Block, BlockKind, Column, Columns, Heading, Image, Paragraph, RichText};
pub use bridge::{AssetUploader, BridgeError, MemoryBridge, PersistenceBridge, UploadError};
#[cfg(feature = "fs")]
pub use bridge::{FileBridge, LocalAssetStore};
pub use canvas::{BlockPin, Canvas, SyncOutcome};
pub use dnd::{Bounds, DragContext, DragPayload, Edge};
pub use document::{Container, Document, Location};
pub use errors::EditorError;
pub use html::render_html;
pub use mutations::{Mutation, MutationError};
pub use render::{apply_edit, view, view_document, BlockView, Control, FieldEdit, RenderContext};
pub use session::{EditSession, Notice, NoticeLevel, UploadTicket};
pub use undo_stack::{HistoryEntry, UndoStack};
