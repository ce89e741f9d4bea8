//! # Block Renderer
//!
//! Maps each block to the editing affordances the canvas shows for it, and
//! turns field edits back into fresh blocks.
//!
//! Edits never touch a block in place: [`apply_edit`] builds a new block
//! with the whole prop set replaced, which the canvas then swaps in with
//! [`Canvas::update_at`](crate::Canvas::update_at).

use crate::block::{Block, BlockKind, Heading, Image, Paragraph, RichText, COLUMN_COUNTS, HEADING_LEVELS};
use crate::dnd::{DragContext, Edge};
use crate::document::{Container, Document, Location};
use crate::mutations::MutationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// State the renderer reads but does not own
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderContext<'a> {
    pub drag: Option<&'a DragContext>,
    /// Image slots with an upload in flight
    pub uploading: Option<&'a HashSet<Location>>,
}

/// Editable presentation of one block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub location: Location,
    pub kind: BlockKind,
    pub label: &'static str,
    /// Drop indicator while something is dragged over this block
    pub indicator: Option<Edge>,
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum Control {
    TextInput {
        value: String,
        multiline: bool,
    },
    LevelSelect {
        value: u8,
        options: Vec<u8>,
    },
    RichTextArea {
        html: String,
    },
    ImageSlot {
        src: String,
        alt: String,
        caption: String,
        /// Upload control is disabled while this is set
        uploading: bool,
    },
    ColumnCountSelect {
        value: u8,
        options: Vec<u8>,
    },
    #[serde(rename_all = "camelCase")]
    DropZone {
        container: Container,
        blocks: Vec<BlockView>,
        accepts: Vec<BlockKind>,
        /// Zone itself is the current drop target
        active: bool,
    },
}

/// A single field change coming from a control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldEdit {
    Text(String),
    Level(u8),
    Html(String),
    Src(String),
    Alt(String),
    Caption(String),
    ColumnCount(u8),
}

impl FieldEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldEdit::Text(_) => "text",
            FieldEdit::Level(_) => "level",
            FieldEdit::Html(_) => "html",
            FieldEdit::Src(_) => "src",
            FieldEdit::Alt(_) => "alt",
            FieldEdit::Caption(_) => "caption",
            FieldEdit::ColumnCount(_) => "columnCount",
        }
    }
}

/// Views for every top-level block
pub fn view_document(doc: &Document, ctx: RenderContext<'_>) -> Vec<BlockView> {
    doc.content
        .iter()
        .enumerate()
        .map(|(index, block)| view(block, Location::canvas(index), ctx))
        .collect()
}

pub fn view(block: &Block, location: Location, ctx: RenderContext<'_>) -> BlockView {
    let controls = match block {
        Block::Heading(heading) => vec![
            Control::TextInput {
                value: heading.text.clone(),
                multiline: false,
            },
            Control::LevelSelect {
                value: heading.level,
                options: HEADING_LEVELS.collect(),
            },
        ],
        Block::Paragraph(paragraph) => vec![Control::TextInput {
            value: paragraph.text.clone(),
            multiline: true,
        }],
        Block::RichText(rich) => vec![Control::RichTextArea {
            html: rich.html.clone(),
        }],
        Block::Image(image) => vec![Control::ImageSlot {
            src: image.src.clone(),
            alt: image.alt.clone(),
            caption: image.caption.clone(),
            uploading: ctx.uploading.is_some_and(|set| set.contains(&location)),
        }],
        Block::Columns(columns) => {
            let mut controls = vec![Control::ColumnCountSelect {
                value: columns.column_count(),
                options: COLUMN_COUNTS.to_vec(),
            }];

            for (column, col) in columns.columns().iter().enumerate() {
                let container = Container::Column {
                    block: location.index,
                    column,
                };
                controls.push(Control::DropZone {
                    container,
                    blocks: col
                        .blocks
                        .iter()
                        .enumerate()
                        .map(|(index, child)| view(child, Location::new(container, index), ctx))
                        .collect(),
                    accepts: BlockKind::ALL
                        .into_iter()
                        .filter(|kind| *kind != BlockKind::Columns)
                        .collect(),
                    active: ctx.drag.is_some_and(|drag| drag.zone_active(container)),
                });
            }

            controls
        }
    };

    BlockView {
        location,
        kind: block.kind(),
        label: block.kind().label(),
        indicator: ctx
            .drag
            .and_then(|drag| drag.indicator(location.container, location.index)),
        controls,
    }
}

/// Build the replacement block for a field edit
pub fn apply_edit(block: &Block, edit: FieldEdit) -> Result<Block, MutationError> {
    let next = match (block, edit) {
        (Block::Heading(heading), FieldEdit::Text(text)) => Block::Heading(Heading {
            text,
            level: heading.level,
        }),
        (Block::Heading(heading), FieldEdit::Level(level)) => {
            if !HEADING_LEVELS.contains(&level) {
                return Err(MutationError::InvalidHeadingLevel(level));
            }
            Block::Heading(Heading {
                text: heading.text.clone(),
                level,
            })
        }
        (Block::Paragraph(_), FieldEdit::Text(text)) => Block::Paragraph(Paragraph { text }),
        (Block::RichText(_), FieldEdit::Html(html)) => Block::RichText(RichText { html }),
        (Block::Image(image), FieldEdit::Src(src)) => Block::Image(Image {
            src,
            ..image.clone()
        }),
        (Block::Image(image), FieldEdit::Alt(alt)) => Block::Image(Image {
            alt,
            ..image.clone()
        }),
        (Block::Image(image), FieldEdit::Caption(caption)) => Block::Image(Image {
            caption,
            ..image.clone()
        }),
        (Block::Columns(columns), FieldEdit::ColumnCount(count)) => {
            Block::Columns(columns.resized(count)?)
        }
        (block, edit) => {
            return Err(MutationError::FieldNotSupported {
                kind: block.kind(),
                field: edit.field_name(),
            })
        }
    };

    Ok(next)
}
