//! # Undo/Redo Stack
//!
//! Tracks local mutation history for a canvas.
//!
//! - Each mutation records its inverse before being applied
//! - Undo applies the inverse and moves the entry to the redo stack
//! - Redo reapplies the original mutation
//! - New mutations clear the redo stack
//! - External resynchronization clears everything (history no longer
//!   describes the tree)

use crate::document::{Document, Location};
use crate::mutations::{Mutation, MutationError};

/// One undoable step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub mutation: Mutation,
    pub inverse: Mutation,
    pub description: String,
}

/// Undo/redo stack for block editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied entries (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone entries (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: Mutation, doc: &mut Document) -> Result<Location, MutationError> {
        // Inverse must be computed against the pre-mutation tree
        let inverse = mutation.to_inverse(doc)?;
        let landed = mutation.apply(doc)?;

        let description = mutation.describe();
        self.undo_stack.push(HistoryEntry {
            mutation,
            inverse,
            description,
        });

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
        Ok(landed)
    }

    /// Undo the most recent entry. Returns the inverse that was applied, or
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<Mutation>, MutationError> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(None);
        };

        if let Err(err) = entry.inverse.apply(doc) {
            self.undo_stack.push(entry);
            return Err(err);
        }

        let applied = entry.inverse.clone();
        self.redo_stack.push(entry);
        Ok(Some(applied))
    }

    /// Redo the most recently undone entry
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<Mutation>, MutationError> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(None);
        };

        if let Err(err) = entry.mutation.apply(doc) {
            self.redo_stack.push(entry);
            return Err(err);
        }

        let applied = entry.mutation.clone();
        self.undo_stack.push(entry);
        Ok(Some(applied))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Label of the next undo step ("Add Heading", "Move block", ...)
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.description.as_str())
    }
}
