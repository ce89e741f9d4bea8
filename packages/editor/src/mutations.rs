//! # Block Mutations
//!
//! Structural operations on a [`Document`]'s block tree.
//!
//! ## Mutation Semantics
//!
//! ### ReplaceBlock
//! - Wholesale replacement of a block's props (never a merge)
//! - Replacement must keep the block's kind
//!
//! ### MoveBlock
//! - Reorders within one container; `to` is the final index
//!
//! ### TransferBlock
//! - Atomic relocation between containers
//! - Removing a canvas block before a Columns block shifts that block's
//!   index; the destination is adjusted before insertion
//! - Columns never land inside a column
//!
//! Every mutation can produce its inverse against the document it is about
//! to be applied to (see [`Mutation::to_inverse`]).

use crate::block::{Block, BlockKind};
use crate::document::{ensure_kind, validate_block, Container, Document, Location};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a block; `at.index` may equal the container length (append)
    InsertBlock { at: Location, block: Block },

    /// Replace a block with a fresh one of the same kind
    ReplaceBlock { at: Location, block: Block },

    /// Remove a block (and, for Columns, everything inside it)
    RemoveBlock { at: Location },

    /// Reorder within a container
    MoveBlock {
        container: Container,
        from: usize,
        to: usize,
    },

    /// Relocate a block to another container
    TransferBlock { from: Location, to: Location },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(Location),

    #[error("Container not found: {0}")]
    ContainerNotFound(Container),

    #[error("Index {index} out of range for {container} (len {len})")]
    IndexOutOfRange {
        container: Container,
        index: usize,
        len: usize,
    },

    #[error("Expected a {expected} block, found {found}")]
    KindMismatch { expected: BlockKind, found: BlockKind },

    #[error("Columns cannot be placed inside a column")]
    NestedColumns,

    #[error(transparent)]
    InvalidColumnCount(#[from] crate::block::InvalidColumnCount),

    #[error("Heading level must be between 1 and 6, got {0}")]
    InvalidHeadingLevel(u8),

    #[error("{kind} blocks have no {field} field")]
    FieldNotSupported { kind: BlockKind, field: &'static str },
}

impl Mutation {
    /// Apply with validation. Returns where the affected block now lives
    /// (for removals, where it used to be).
    pub fn apply(&self, doc: &mut Document) -> Result<Location, MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::InsertBlock { at, block } => {
                container_mut(doc, at.container)?.insert(at.index, block.clone());
                Ok(*at)
            }

            Mutation::ReplaceBlock { at, block } => {
                let slot = container_mut(doc, at.container)?
                    .get_mut(at.index)
                    .ok_or(MutationError::BlockNotFound(*at))?;
                *slot = block.clone();
                Ok(*at)
            }

            Mutation::RemoveBlock { at } => {
                container_mut(doc, at.container)?.remove(at.index);
                Ok(*at)
            }

            Mutation::MoveBlock {
                container,
                from,
                to,
            } => {
                let blocks = container_mut(doc, *container)?;
                let block = blocks.remove(*from);
                blocks.insert(*to, block);
                Ok(Location::new(*container, *to))
            }

            Mutation::TransferBlock { from, to } => {
                let landed = Self::transfer_landing(*from, *to);
                let block = container_mut(doc, from.container)?.remove(from.index);
                container_mut(doc, landed.container)?.insert(landed.index, block);
                Ok(landed)
            }
        }
    }

    /// Destination after the source has been taken out
    fn transfer_landing(from: Location, to: Location) -> Location {
        if from.container == to.container {
            return to;
        }

        let container = match from.container {
            Container::Canvas => to.container.after_canvas_removal(from.index),
            Container::Column { .. } => to.container,
        };
        Location::new(container, to.index)
    }

    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlock { at, block } => {
                let len = container(doc, at.container)?.len();
                check_insert_index(at.container, at.index, len)?;
                validate_block(block, at.container.is_column())
            }

            Mutation::ReplaceBlock { at, block } => {
                let existing = get(doc, *at)?;
                ensure_kind(existing.kind(), block)?;
                validate_block(block, at.container.is_column())
            }

            Mutation::RemoveBlock { at } => get(doc, *at).map(|_| ()),

            Mutation::MoveBlock {
                container: target,
                from,
                to,
            } => {
                let len = container(doc, *target)?.len();
                check_index(*target, *from, len)?;
                check_index(*target, *to, len)
            }

            Mutation::TransferBlock { from, to } => {
                let block = get(doc, *from)?;
                let len = container(doc, to.container)?.len();

                if from.container == to.container {
                    return check_index(to.container, to.index, len);
                }

                if to.container.is_column() && block.kind() == BlockKind::Columns {
                    return Err(MutationError::NestedColumns);
                }
                check_insert_index(to.container, to.index, len)
            }
        }
    }

    /// Mutation that undoes `self` once applied to `doc`
    pub fn to_inverse(&self, doc: &Document) -> Result<Mutation, MutationError> {
        self.validate(doc)?;

        Ok(match self {
            Mutation::InsertBlock { at, .. } => Mutation::RemoveBlock { at: *at },

            Mutation::ReplaceBlock { at, .. } => Mutation::ReplaceBlock {
                at: *at,
                block: get(doc, *at)?.clone(),
            },

            Mutation::RemoveBlock { at } => Mutation::InsertBlock {
                at: *at,
                block: get(doc, *at)?.clone(),
            },

            Mutation::MoveBlock {
                container,
                from,
                to,
            } => Mutation::MoveBlock {
                container: *container,
                from: *to,
                to: *from,
            },

            Mutation::TransferBlock { from, to } => {
                let landed = Self::transfer_landing(*from, *to);
                let origin = if from.container == landed.container {
                    from.container
                } else if landed.container == Container::Canvas {
                    from.container.after_canvas_insertion(landed.index)
                } else {
                    from.container
                };

                Mutation::TransferBlock {
                    from: landed,
                    to: Location::new(origin, from.index),
                }
            }
        })
    }

    /// Where the block found at `loc` before this mutation sits afterwards.
    /// `None` when the mutation removed it.
    pub fn relocate(&self, loc: Location) -> Option<Location> {
        match self {
            Mutation::InsertBlock { at, .. } => Some(after_insertion(loc, *at)),

            Mutation::ReplaceBlock { at, block } => match (at.container, loc.container, block) {
                // Shrinking a Columns block drops the trailing columns' blocks
                (Container::Canvas, Container::Column { block: owner, column }, Block::Columns(columns))
                    if owner == at.index && column >= columns.columns().len() =>
                {
                    None
                }
                _ => Some(loc),
            },

            Mutation::RemoveBlock { at } => after_removal(loc, *at),

            Mutation::MoveBlock {
                container,
                from,
                to,
            } => carry(
                loc,
                Location::new(*container, *from),
                Location::new(*container, *to),
            ),

            Mutation::TransferBlock { from, to } => {
                carry(loc, *from, Self::transfer_landing(*from, *to))
            }
        }
    }

    /// Short label for history entries
    pub fn describe(&self) -> String {
        match self {
            Mutation::InsertBlock { block, .. } => format!("Add {}", block.kind().label()),
            Mutation::ReplaceBlock { block, .. } => format!("Edit {}", block.kind().label()),
            Mutation::RemoveBlock { .. } => "Delete block".to_string(),
            Mutation::MoveBlock { .. } => "Move block".to_string(),
            Mutation::TransferBlock { .. } => "Move block".to_string(),
        }
    }
}

/// `loc` after the block at `at` is taken out
fn after_removal(loc: Location, at: Location) -> Option<Location> {
    if loc == at {
        return None;
    }

    let container = match (at.container, loc.container) {
        (Container::Canvas, Container::Column { block, .. }) if block == at.index => return None,
        (Container::Canvas, other) => other.after_canvas_removal(at.index),
        (_, other) => other,
    };
    let index = if loc.container == at.container && loc.index > at.index {
        loc.index - 1
    } else {
        loc.index
    };
    Some(Location::new(container, index))
}

/// `loc` after a block is inserted at `at`
fn after_insertion(loc: Location, at: Location) -> Location {
    let container = match at.container {
        Container::Canvas => loc.container.after_canvas_insertion(at.index),
        Container::Column { .. } => loc.container,
    };
    let index = if loc.container == at.container && loc.index >= at.index {
        loc.index + 1
    } else {
        loc.index
    };
    Location::new(container, index)
}

/// `loc` after the block at `from` is taken out and reinserted at `landed`
/// (expressed in post-removal coordinates)
fn carry(loc: Location, from: Location, landed: Location) -> Option<Location> {
    if loc == from {
        return Some(landed);
    }

    // Children of a Columns block travel with it
    if let (Container::Canvas, Container::Column { block, column }) = (from.container, loc.container) {
        if block == from.index && landed.container == Container::Canvas {
            return Some(Location::new(
                Container::Column {
                    block: landed.index,
                    column,
                },
                loc.index,
            ));
        }
    }

    after_removal(loc, from).map(|moved| after_insertion(moved, landed))
}

fn container(doc: &Document, target: Container) -> Result<&Vec<Block>, MutationError> {
    doc.container(target)
        .ok_or(MutationError::ContainerNotFound(target))
}

fn container_mut(doc: &mut Document, target: Container) -> Result<&mut Vec<Block>, MutationError> {
    doc.container_mut(target)
        .ok_or(MutationError::ContainerNotFound(target))
}

fn get(doc: &Document, at: Location) -> Result<&Block, MutationError> {
    doc.get(at).ok_or(MutationError::BlockNotFound(at))
}

fn check_index(container: Container, index: usize, len: usize) -> Result<(), MutationError> {
    if index < len {
        Ok(())
    } else {
        Err(MutationError::IndexOutOfRange {
            container,
            index,
            len,
        })
    }
}

fn check_insert_index(container: Container, index: usize, len: usize) -> Result<(), MutationError> {
    if index <= len {
        Ok(())
    } else {
        Err(MutationError::IndexOutOfRange {
            container,
            index,
            len,
        })
    }
}
