//! # Drag and Drop
//!
//! An explicit drag context replaces ambient drag state. One context is
//! shared by every drop zone of a canvas.
//!
//! ## Hover state (per block)
//!
//! ```text
//! idle ──over_block──► dragOver(top|bottom) ──drop──► idle
//!                            │
//!                            └──leave──► idle
//! ```
//!
//! The pointer above a block's vertical midpoint targets the slot before it;
//! below the midpoint targets the slot after it.
//!
//! ## Payload wire form
//!
//! Palette items and blocks put a JSON payload on the drag transfer:
//!
//! ```text
//! {"isNewBlock": true,  "blockType": "Heading"}
//! {"isNewBlock": false, "sourceIndex": 2}
//! {"isNewBlock": false, "sourceIndex": 0, "sourceBlock": 1, "sourceColumn": 0}
//! ```
//!
//! Anything malformed is ignored and the drop does nothing.

use crate::block::BlockKind;
use crate::canvas::Canvas;
use crate::document::{Container, Location};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPayload {
    /// A new block from the palette
    NewBlock { kind: BlockKind },
    /// A block already in the document
    Existing { source: Location },
}

/// Which side of the hovered block the drop indicator is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Edge {
    Top,
    Bottom,
}

/// Vertical extent of a rendered block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn edge_for(&self, pointer_y: f64) -> Edge {
        if pointer_y < self.midpoint() {
            Edge::Top
        } else {
            Edge::Bottom
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Block { index: usize, edge: Edge },
    /// The zone itself (empty column, end of list)
    Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hover {
    container: Container,
    target: Target,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    is_new_block: Option<bool>,
    block_type: Option<String>,
    source_index: Option<usize>,
    source_block: Option<usize>,
    source_column: Option<usize>,
}

impl DragPayload {
    /// Decode a transfer payload; `None` for anything malformed
    pub fn decode(raw: &str) -> Option<Self> {
        let wire: WirePayload = serde_json::from_str(raw).ok()?;

        match wire.is_new_block? {
            true => {
                let kind = wire.block_type?.parse().ok()?;
                Some(DragPayload::NewBlock { kind })
            }
            false => {
                let index = wire.source_index?;
                let container = match (wire.source_block, wire.source_column) {
                    (None, None) => Container::Canvas,
                    (Some(block), Some(column)) => Container::Column { block, column },
                    _ => return None,
                };
                Some(DragPayload::Existing {
                    source: Location::new(container, index),
                })
            }
        }
    }

    pub fn encode(&self) -> String {
        let value = match self {
            DragPayload::NewBlock { kind } => serde_json::json!({
                "isNewBlock": true,
                "blockType": kind.as_str(),
            }),
            DragPayload::Existing { source } => match source.container {
                Container::Canvas => serde_json::json!({
                    "isNewBlock": false,
                    "sourceIndex": source.index,
                }),
                Container::Column { block, column } => serde_json::json!({
                    "isNewBlock": false,
                    "sourceIndex": source.index,
                    "sourceBlock": block,
                    "sourceColumn": column,
                }),
            },
        };
        value.to_string()
    }
}

/// Drag state shared across the canvas and its column zones
#[derive(Debug, Default, Clone)]
pub struct DragContext {
    payload: Option<DragPayload>,
    hover: Option<Hover>,
}

impl DragContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, payload: DragPayload) {
        self.payload = Some(payload);
        self.hover = None;
    }

    /// Start a drag from a wire payload. Returns false (and stays idle) if
    /// the payload is malformed.
    pub fn begin_encoded(&mut self, raw: &str) -> bool {
        match DragPayload::decode(raw) {
            Some(payload) => {
                self.begin(payload);
                true
            }
            None => {
                debug!(payload = raw, "Ignoring malformed drag payload");
                self.cancel();
                false
            }
        }
    }

    pub fn payload(&self) -> Option<DragPayload> {
        self.payload
    }

    pub fn is_dragging(&self) -> bool {
        self.payload.is_some()
    }

    /// Pointer moved over the block at `index` of `container`
    pub fn over_block(&mut self, container: Container, index: usize, bounds: Bounds, pointer_y: f64) -> Edge {
        let edge = bounds.edge_for(pointer_y);
        self.hover = Some(Hover {
            container,
            target: Target::Block { index, edge },
        });
        edge
    }

    /// Pointer moved over a zone's empty area; a drop appends
    pub fn over_zone(&mut self, container: Container) {
        self.hover = Some(Hover {
            container,
            target: Target::Zone,
        });
    }

    /// Pointer left the block; only clears the hover it owns
    pub fn leave(&mut self, container: Container, index: usize) {
        if self.indicator(container, index).is_some() {
            self.hover = None;
        }
    }

    /// Pointer left a zone
    pub fn leave_zone(&mut self, container: Container) {
        if self.zone_active(container) {
            self.hover = None;
        }
    }

    /// Indicator to draw on a block, if it is the current target
    pub fn indicator(&self, container: Container, index: usize) -> Option<Edge> {
        match self.hover {
            Some(Hover {
                container: hovered,
                target: Target::Block { index: i, edge },
            }) if hovered == container && i == index => Some(edge),
            _ => None,
        }
    }

    pub fn zone_active(&self, container: Container) -> bool {
        matches!(
            self.hover,
            Some(Hover { container: hovered, target: Target::Zone }) if hovered == container
        )
    }

    /// Back to idle without changing anything
    pub fn cancel(&mut self) {
        self.payload = None;
        self.hover = None;
    }

    /// Complete the drag against `canvas`. Returns where the block landed,
    /// or `None` when the drop did nothing. The context is idle afterwards.
    pub fn drop(&mut self, canvas: &mut Canvas) -> Option<Location> {
        let payload = self.payload.take();
        let hover = self.hover.take();

        let (Some(payload), Some(hover)) = (payload, hover) else {
            debug!("Drop without payload or target ignored");
            return None;
        };

        let len = canvas.document().container(hover.container)?.len();
        let nominal = match hover.target {
            Target::Block { index, .. } if index >= len => {
                debug!(index, len, "Drop target no longer exists");
                return None;
            }
            Target::Block { index, edge: Edge::Top } => index,
            Target::Block { index, edge: Edge::Bottom } => index + 1,
            Target::Zone => len,
        };

        let result = match payload {
            DragPayload::NewBlock { kind } => {
                canvas.insert_block(Location::new(hover.container, nominal), kind)
            }
            DragPayload::Existing { source } if source.container == hover.container => {
                // Removing the source first shifts everything after it up by one
                let target = if source.index < nominal { nominal - 1 } else { nominal };
                if target == source.index {
                    debug!(location = %source, "Block dropped onto its own position");
                    return None;
                }
                canvas
                    .move_within(hover.container, source.index, target)
                    .map(|_| Location::new(hover.container, target))
            }
            DragPayload::Existing { source } => {
                canvas.transfer(source, Location::new(hover.container, nominal))
            }
        };

        match result {
            Ok(landed) => Some(landed),
            Err(err) => {
                debug!(error = %err, "Drop ignored");
                None
            }
        }
    }
}
