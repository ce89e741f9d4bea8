//! # Document
//!
//! An article body: ordered top-level blocks plus a root property bag.
//!
//! Documents cross the persistence boundary as an opaque JSON string:
//!
//! ```text
//! {"content": [{"type": "Heading", "props": {...}}, ...], "root": {...}}
//! ```
//!
//! Blocks are addressed by [`Location`]: a [`Container`] (the canvas or one
//! column of a Columns block on the canvas) plus an index into it.

use crate::block::{Block, BlockKind, HEADING_LEVELS};
use crate::mutations::MutationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Editable article body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks, in display order
    #[serde(default)]
    pub content: Vec<Block>,

    /// Document-level properties (title overrides, layout flags, ...)
    #[serde(default)]
    pub root: Map<String, Value>,
}

/// A list of blocks that accepts drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Container {
    /// The top-level canvas
    Canvas,
    /// Column `column` of the Columns block at canvas index `block`
    Column { block: usize, column: usize },
}

impl Container {
    /// Where this container sits after the canvas block at `removed` is taken out
    pub(crate) fn after_canvas_removal(self, removed: usize) -> Self {
        match self {
            Container::Column { block, column } if removed < block => Container::Column {
                block: block - 1,
                column,
            },
            other => other,
        }
    }

    /// Where this container sits after a block is inserted on the canvas at `inserted`
    pub(crate) fn after_canvas_insertion(self, inserted: usize) -> Self {
        match self {
            Container::Column { block, column } if inserted <= block => Container::Column {
                block: block + 1,
                column,
            },
            other => other,
        }
    }

    pub fn is_column(self) -> bool {
        matches!(self, Container::Column { .. })
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Canvas => f.write_str("canvas"),
            Container::Column { block, column } => write!(f, "block {} column {}", block, column),
        }
    }
}

/// Address of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub container: Container,
    pub index: usize,
}

impl Location {
    pub fn new(container: Container, index: usize) -> Self {
        Self { container, index }
    }

    /// Top-level block
    pub fn canvas(index: usize) -> Self {
        Self::new(Container::Canvas, index)
    }

    /// Block inside a column
    pub fn column(block: usize, column: usize, index: usize) -> Self {
        Self::new(Container::Column { block, column }, index)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.container, self.index)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(content: Vec<Block>) -> Self {
        Self {
            content,
            root: Map::new(),
        }
    }

    /// Parse and validate serialized content
    pub fn parse(raw: &str) -> Result<Self, crate::EditorError> {
        let doc: Document = serde_json::from_str(raw)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Parse serialized content, substituting an empty document when it is
    /// unreadable. Blank input is an empty document.
    pub fn parse_or_empty(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::new();
        }

        match Self::parse(raw) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(error = %err, "Discarding unreadable document content");
                Self::new()
            }
        }
    }

    /// Serialize for the persistence bridge
    pub fn to_json(&self) -> Result<String, crate::EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check structural invariants: heading levels in range and no Columns
    /// inside a column.
    pub fn validate(&self) -> Result<(), MutationError> {
        for block in &self.content {
            validate_block(block, false)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Blocks of a container
    pub fn container(&self, container: Container) -> Option<&Vec<Block>> {
        match container {
            Container::Canvas => Some(&self.content),
            Container::Column { block, column } => self
                .content
                .get(block)?
                .as_columns()?
                .column(column)
                .map(|c| &c.blocks),
        }
    }

    pub fn container_mut(&mut self, container: Container) -> Option<&mut Vec<Block>> {
        match container {
            Container::Canvas => Some(&mut self.content),
            Container::Column { block, column } => self
                .content
                .get_mut(block)?
                .as_columns_mut()?
                .column_mut(column)
                .map(|c| &mut c.blocks),
        }
    }

    pub fn get(&self, location: Location) -> Option<&Block> {
        self.container(location.container)?.get(location.index)
    }

    /// Every block with its location, depth-first in display order
    pub fn locations(&self) -> Vec<(Location, &Block)> {
        let mut out = Vec::new();
        for (index, block) in self.content.iter().enumerate() {
            out.push((Location::canvas(index), block));
            if let Some(columns) = block.as_columns() {
                for (column, col) in columns.columns().iter().enumerate() {
                    for (child, nested) in col.blocks.iter().enumerate() {
                        out.push((Location::column(index, column, child), nested));
                    }
                }
            }
        }
        out
    }

    /// Total blocks including those nested in columns
    pub fn block_count(&self) -> usize {
        self.locations().len()
    }
}

pub(crate) fn validate_block(block: &Block, nested: bool) -> Result<(), MutationError> {
    match block {
        Block::Heading(heading) if !HEADING_LEVELS.contains(&heading.level) => {
            Err(MutationError::InvalidHeadingLevel(heading.level))
        }
        Block::Columns(_) if nested => Err(MutationError::NestedColumns),
        Block::Columns(columns) => {
            for column in columns.columns() {
                for child in &column.blocks {
                    validate_block(child, true)?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Kind check used by wholesale replacement
pub(crate) fn ensure_kind(expected: BlockKind, block: &Block) -> Result<(), MutationError> {
    if block.kind() == expected {
        Ok(())
    } else {
        Err(MutationError::KindMismatch {
            expected,
            found: block.kind(),
        })
    }
}
