//! # Canvas State Manager
//!
//! Owns the block tree being edited and reconciles it with externally
//! supplied documents.
//!
//! Two kinds of change reach a canvas:
//!
//! ```text
//! local action  ──► mutation ──► history ──► on_change(document)
//! external sync ──► echo?  ──yes──► ignored
//!                      └──no───► replace document (no notification)
//! ```
//!
//! Every document handed to the change listener is remembered until the
//! outside world echoes it back, so an echo is never re-applied as a reset.
//! Initial mount, resynchronization and no-op edits never notify.
//!
//! A [`BlockPin`] names one block across local edits: every mutation, undo
//! and redo carries pinned locations along, and a pin is released once its
//! block is removed or the canvas is reset.

use crate::block::{Block, BlockKind};
use crate::document::{Container, Document, Location};
use crate::mutations::{Mutation, MutationError};
use crate::render::{apply_edit, FieldEdit};
use crate::undo_stack::UndoStack;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, info};

/// Emitted snapshots awaiting their echo
const ECHO_WINDOW: usize = 16;

type ChangeListener = Box<dyn FnMut(&Document)>;

/// Handle on one block that survives edits elsewhere in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPin(u64);

/// What an external resynchronization did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Incoming content was one of our own emissions
    Echo,
    /// Incoming content already matches the canvas
    Unchanged,
    /// Canvas replaced with the incoming content
    Reset,
}

pub struct Canvas {
    document: Document,
    history: UndoStack,
    /// Increments on every change to the document, local or external
    version: u64,
    emitted: VecDeque<Document>,
    listener: Option<ChangeListener>,
    pins: HashMap<BlockPin, Location>,
    next_pin: u64,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("document", &self.document)
            .field("version", &self.version)
            .field("pending_echoes", &self.emitted.len())
            .field("has_listener", &self.listener.is_some())
            .field("pins", &self.pins.len())
            .finish()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Empty canvas
    pub fn new() -> Self {
        Self::from_document(Document::new())
    }

    /// Mount an existing document
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            history: UndoStack::new(),
            version: 0,
            emitted: VecDeque::new(),
            listener: None,
            pins: HashMap::new(),
            next_pin: 0,
        }
    }

    /// Mount serialized content; unreadable content mounts an empty document
    pub fn mount(raw: &str) -> Self {
        Self::from_document(Document::parse_or_empty(raw))
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(levels);
        self
    }

    /// Register the change listener (replaces any previous one)
    pub fn on_change(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Opaque form for the persistence bridge
    pub fn serialize(&self) -> Result<String, crate::EditorError> {
        self.document.to_json()
    }

    /// Append a default block of `kind`; returns its index
    pub fn add_block(&mut self, kind: BlockKind) -> Result<usize, MutationError> {
        let at = Location::canvas(self.document.content.len());
        self.commit(Mutation::InsertBlock {
            at,
            block: Block::new(kind),
        })
        .map(|landed| landed.index)
    }

    /// Insert a default block of `kind` at any location
    pub fn insert_block(&mut self, at: Location, kind: BlockKind) -> Result<Location, MutationError> {
        self.insert(at, Block::new(kind))
    }

    pub fn insert(&mut self, at: Location, block: Block) -> Result<Location, MutationError> {
        self.commit(Mutation::InsertBlock { at, block })
    }

    /// Replace the props of a top-level block wholesale
    pub fn update_block(&mut self, index: usize, block: Block) -> Result<(), MutationError> {
        self.update_at(Location::canvas(index), block)
    }

    /// Replace the props of any block wholesale. Replacing a block with an
    /// identical one is a no-op.
    pub fn update_at(&mut self, at: Location, block: Block) -> Result<(), MutationError> {
        if self.document.get(at) == Some(&block) {
            return Ok(());
        }

        self.commit(Mutation::ReplaceBlock { at, block }).map(|_| ())
    }

    /// Apply a single field edit to a block
    pub fn edit(&mut self, at: Location, edit: FieldEdit) -> Result<(), MutationError> {
        let current = self
            .document
            .get(at)
            .ok_or(MutationError::BlockNotFound(at))?;
        let next = apply_edit(current, edit)?;
        self.update_at(at, next)
    }

    pub fn delete_block(&mut self, index: usize) -> Result<Block, MutationError> {
        self.delete_at(Location::canvas(index))
    }

    pub fn delete_at(&mut self, at: Location) -> Result<Block, MutationError> {
        let removed = self
            .document
            .get(at)
            .cloned()
            .ok_or(MutationError::BlockNotFound(at))?;
        self.commit(Mutation::RemoveBlock { at })?;
        Ok(removed)
    }

    /// Reorder top-level blocks; `to` is the block's final index
    pub fn move_block(&mut self, from: usize, to: usize) -> Result<(), MutationError> {
        self.move_within(Container::Canvas, from, to)
    }

    pub fn move_within(&mut self, container: Container, from: usize, to: usize) -> Result<(), MutationError> {
        let mutation = Mutation::MoveBlock {
            container,
            from,
            to,
        };
        mutation.validate(&self.document)?;

        if from == to {
            return Ok(());
        }

        self.commit(mutation).map(|_| ())
    }

    /// Relocate a block, possibly into another container, in one step.
    /// Returns where the block landed.
    pub fn transfer(&mut self, from: Location, to: Location) -> Result<Location, MutationError> {
        if from.container == to.container {
            self.move_within(from.container, from.index, to.index)?;
            return Ok(to);
        }

        self.commit(Mutation::TransferBlock { from, to })
    }

    /// Resize the Columns block at canvas `index`
    pub fn set_column_count(&mut self, index: usize, count: u8) -> Result<(), MutationError> {
        self.edit(Location::canvas(index), FieldEdit::ColumnCount(count))
    }

    pub fn undo(&mut self) -> Result<bool, MutationError> {
        let Some(applied) = self.history.undo(&mut self.document)? else {
            return Ok(false);
        };
        self.after_local_change(&applied);
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, MutationError> {
        let Some(applied) = self.history.redo(&mut self.document)? else {
            return Ok(false);
        };
        self.after_local_change(&applied);
        Ok(true)
    }

    /// Pin the block at `at`; `None` if there is no block there
    pub fn pin(&mut self, at: Location) -> Option<BlockPin> {
        self.document.get(at)?;
        let pin = BlockPin(self.next_pin);
        self.next_pin += 1;
        self.pins.insert(pin, at);
        Some(pin)
    }

    /// Current location of a pinned block; `None` once it is gone
    pub fn pinned(&self, pin: BlockPin) -> Option<Location> {
        self.pins.get(&pin).copied()
    }

    pub fn unpin(&mut self, pin: BlockPin) {
        self.pins.remove(&pin);
    }

    /// Reconcile with serialized content from outside
    pub fn sync_external(&mut self, raw: &str) -> SyncOutcome {
        self.sync_document(Document::parse_or_empty(raw))
    }

    /// Reconcile with a document from outside. Never notifies the listener.
    pub fn sync_document(&mut self, incoming: Document) -> SyncOutcome {
        if let Some(position) = self.emitted.iter().position(|sent| *sent == incoming) {
            self.emitted.drain(..=position);
            debug!(version = self.version, "Ignoring echo of emitted document");
            return SyncOutcome::Echo;
        }

        self.emitted.clear();

        if incoming == self.document {
            return SyncOutcome::Unchanged;
        }

        self.document = incoming;
        self.history.clear();
        self.pins.clear();
        self.version += 1;
        info!(
            version = self.version,
            blocks = self.document.content.len(),
            "Canvas reset from external document"
        );
        SyncOutcome::Reset
    }

    fn commit(&mut self, mutation: Mutation) -> Result<Location, MutationError> {
        debug!(action = %mutation.describe(), "Applying block mutation");
        let landed = self.history.apply(mutation.clone(), &mut self.document)?;
        self.after_local_change(&mutation);
        Ok(landed)
    }

    fn after_local_change(&mut self, applied: &Mutation) {
        self.version += 1;

        self.pins.retain(|pin, at| match applied.relocate(*at) {
            Some(moved) => {
                *at = moved;
                true
            }
            None => {
                debug!(pin = pin.0, location = %at, "Pinned block removed");
                false
            }
        });

        self.emitted.push_back(self.document.clone());
        if self.emitted.len() > ECHO_WINDOW {
            self.emitted.pop_front();
        }

        if let Some(listener) = self.listener.as_mut() {
            listener(&self.document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(canvas: &mut Canvas) -> Rc<RefCell<Vec<Document>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        canvas.on_change(move |doc| sink.borrow_mut().push(doc.clone()));
        seen
    }

    #[test]
    fn test_mount_does_not_notify() {
        let raw = Document::with_blocks(vec![Block::paragraph("a")]).to_json().unwrap();
        let mut canvas = Canvas::mount(&raw);
        let seen = recording(&mut canvas);

        assert_eq!(canvas.document().content.len(), 1);
        assert_eq!(canvas.version(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_local_change_notifies_once() {
        let mut canvas = Canvas::new();
        let seen = recording(&mut canvas);

        canvas.add_block(BlockKind::Paragraph).unwrap();

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0], *canvas.document());
    }

    #[test]
    fn test_noop_and_failed_mutations_do_not_notify() {
        let mut canvas = Canvas::from_document(Document::with_blocks(vec![
            Block::paragraph("a"),
            Block::paragraph("b"),
        ]));
        let seen = recording(&mut canvas);

        canvas.move_block(1, 1).unwrap();
        canvas.update_block(0, Block::paragraph("a")).unwrap();
        assert!(canvas.move_block(0, 5).is_err());
        assert!(canvas.update_block(0, Block::heading("x", 2)).is_err());

        assert!(seen.borrow().is_empty());
        assert_eq!(canvas.version(), 0);
    }

    #[test]
    fn test_echo_is_ignored() {
        let mut canvas = Canvas::new();
        let seen = recording(&mut canvas);

        canvas.add_block(BlockKind::Heading).unwrap();
        let echoed = seen.borrow()[0].to_json().unwrap();

        assert_eq!(canvas.sync_external(&echoed), SyncOutcome::Echo);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(canvas.document().content.len(), 1);
    }

    #[test]
    fn test_stale_echo_does_not_clobber_newer_edits() {
        let mut canvas = Canvas::new();
        let seen = recording(&mut canvas);

        canvas.add_block(BlockKind::Heading).unwrap();
        canvas.add_block(BlockKind::Paragraph).unwrap();
        let first = seen.borrow()[0].clone();

        assert_eq!(canvas.sync_document(first), SyncOutcome::Echo);
        assert_eq!(canvas.document().content.len(), 2);
    }

    #[test]
    fn test_external_change_resets_without_notifying() {
        let mut canvas = Canvas::new();
        let seen = recording(&mut canvas);
        canvas.add_block(BlockKind::Heading).unwrap();

        let external = Document::with_blocks(vec![Block::paragraph("from server")]);
        assert_eq!(canvas.sync_document(external.clone()), SyncOutcome::Reset);

        assert_eq!(*canvas.document(), external);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!canvas.history().can_undo());
    }

    #[test]
    fn test_unreadable_external_content_resets_to_empty() {
        let mut canvas = Canvas::from_document(Document::with_blocks(vec![Block::paragraph("a")]));

        assert_eq!(canvas.sync_external("{broken"), SyncOutcome::Reset);
        assert!(canvas.document().is_empty());
    }

    #[test]
    fn test_matching_external_content_is_unchanged() {
        let doc = Document::with_blocks(vec![Block::paragraph("a")]);
        let mut canvas = Canvas::from_document(doc.clone());

        assert_eq!(canvas.sync_document(doc), SyncOutcome::Unchanged);
        assert_eq!(canvas.version(), 0);
    }

    #[test]
    fn test_undo_notifies_as_local_change() {
        let mut canvas = Canvas::new();
        let seen = recording(&mut canvas);

        canvas.add_block(BlockKind::Image).unwrap();
        assert!(canvas.undo().unwrap());
        assert!(canvas.document().is_empty());
        assert_eq!(seen.borrow().len(), 2);

        assert!(canvas.redo().unwrap());
        assert_eq!(canvas.document().content.len(), 1);
        assert!(!canvas.redo().unwrap());
    }

    #[test]
    fn test_set_column_count_on_non_columns_fails() {
        let mut canvas = Canvas::from_document(Document::with_blocks(vec![Block::paragraph("a")]));
        assert!(matches!(
            canvas.set_column_count(0, 3),
            Err(MutationError::FieldNotSupported { .. })
        ));
    }

    #[test]
    fn test_oldest_emission_leaves_echo_window() {
        let mut canvas = Canvas::new();
        let seen = recording(&mut canvas);

        for _ in 0..=ECHO_WINDOW {
            canvas.add_block(BlockKind::Paragraph).unwrap();
        }
        let emitted = seen.borrow().clone();
        assert_eq!(emitted.len(), ECHO_WINDOW + 1);

        assert_eq!(canvas.sync_document(emitted[1].clone()), SyncOutcome::Echo);
        assert_eq!(canvas.sync_document(emitted[0].clone()), SyncOutcome::Reset);
        assert_eq!(*canvas.document(), emitted[0]);
    }

    #[test]
    fn test_pin_follows_block_through_edits() {
        let mut canvas = Canvas::from_document(Document::with_blocks(vec![
            Block::paragraph("a"),
            Block::paragraph("b"),
            Block::paragraph("c"),
        ]));
        let pin = canvas.pin(Location::canvas(2)).unwrap();

        canvas.delete_block(0).unwrap();
        assert_eq!(canvas.pinned(pin), Some(Location::canvas(1)));

        canvas.move_block(1, 0).unwrap();
        assert_eq!(canvas.pinned(pin), Some(Location::canvas(0)));

        canvas.undo().unwrap();
        canvas.undo().unwrap();
        assert_eq!(canvas.pinned(pin), Some(Location::canvas(2)));
        assert_eq!(
            canvas.document().get(Location::canvas(2)),
            Some(&Block::paragraph("c"))
        );
    }

    #[test]
    fn test_pin_released_when_block_removed_or_reset() {
        let mut canvas = Canvas::from_document(Document::with_blocks(vec![
            Block::paragraph("a"),
            Block::paragraph("b"),
        ]));
        assert_eq!(canvas.pin(Location::canvas(5)), None);

        let removed = canvas.pin(Location::canvas(0)).unwrap();
        let kept = canvas.pin(Location::canvas(1)).unwrap();
        canvas.delete_block(0).unwrap();
        assert_eq!(canvas.pinned(removed), None);
        assert_eq!(canvas.pinned(kept), Some(Location::canvas(0)));

        // Undo restores the block but not the released pin
        canvas.undo().unwrap();
        assert_eq!(canvas.pinned(removed), None);

        canvas.sync_document(Document::with_blocks(vec![Block::paragraph("new")]));
        assert_eq!(canvas.pinned(kept), None);
    }
}
