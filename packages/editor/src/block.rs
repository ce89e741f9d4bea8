//! # Content Blocks
//!
//! Typed units of article content. A block serializes as
//! `{"type": "<Kind>", "props": {...}}` so the stored form stays a plain
//! property bag while the in-memory form is a closed enum.
//!
//! Column containers hold their own block lists. Nesting is shallow: a
//! block inside a column is never itself a [`Block::Columns`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column counts a Columns block may take
pub const COLUMN_COUNTS: [u8; 3] = [2, 3, 4];

/// Heading levels (h1..h6)
pub const HEADING_LEVELS: std::ops::RangeInclusive<u8> = 1..=6;

/// Type tag of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Heading,
    Paragraph,
    RichText,
    Image,
    Columns,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Heading,
        BlockKind::Paragraph,
        BlockKind::RichText,
        BlockKind::Image,
        BlockKind::Columns,
    ];

    /// Palette label
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Heading => "Heading",
            BlockKind::Paragraph => "Paragraph",
            BlockKind::RichText => "Rich Text",
            BlockKind::Image => "Image",
            BlockKind::Columns => "Columns",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading => "Heading",
            BlockKind::Paragraph => "Paragraph",
            BlockKind::RichText => "RichText",
            BlockKind::Image => "Image",
            BlockKind::Columns => "Columns",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown block type tag
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown block type: {0}")]
pub struct UnknownBlockKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    /// Accepts the type tag (`RichText`) or its lowercase/kebab spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "heading" => Ok(BlockKind::Heading),
            "paragraph" => Ok(BlockKind::Paragraph),
            "richtext" => Ok(BlockKind::RichText),
            "image" => Ok(BlockKind::Image),
            "columns" => Ok(BlockKind::Columns),
            _ => Err(UnknownBlockKind(s.to_string())),
        }
    }
}

/// A single editable block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props")]
pub enum Block {
    Heading(Heading),
    Paragraph(Paragraph),
    RichText(RichText),
    Image(Image),
    Columns(Columns),
}

impl Block {
    /// Create a block with the kind's default props
    pub fn new(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Heading => Block::Heading(Heading::default()),
            BlockKind::Paragraph => Block::Paragraph(Paragraph::default()),
            BlockKind::RichText => Block::RichText(RichText::default()),
            BlockKind::Image => Block::Image(Image::default()),
            BlockKind::Columns => Block::Columns(Columns::default()),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading(_) => BlockKind::Heading,
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::RichText(_) => BlockKind::RichText,
            Block::Image(_) => BlockKind::Image,
            Block::Columns(_) => BlockKind::Columns,
        }
    }

    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Block::Heading(Heading {
            text: text.into(),
            level,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph { text: text.into() })
    }

    pub fn as_columns(&self) -> Option<&Columns> {
        match self {
            Block::Columns(columns) => Some(columns),
            _ => None,
        }
    }

    pub fn as_columns_mut(&mut self) -> Option<&mut Columns> {
        match self {
            Block::Columns(columns) => Some(columns),
            _ => None,
        }
    }

    /// Short plain-text preview (for outlines and logs)
    pub fn summary(&self) -> String {
        match self {
            Block::Heading(h) => format!("h{} {}", h.level, h.text),
            Block::Paragraph(p) => p.text.clone(),
            Block::RichText(r) => strip_tags(&r.html),
            Block::Image(i) if i.src.is_empty() => "(no image)".to_string(),
            Block::Image(i) => i.src.clone(),
            Block::Columns(c) => format!("{} columns", c.column_count()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub level: u8,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            text: "Heading".to_string(),
            level: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self {
            text: "Start writing...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub html: String,
}

impl Default for RichText {
    fn default() -> Self {
        Self {
            html: "<p>Start writing...</p>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: String,
}

/// One column of a Columns block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Multi-column container. `columns.len()` always equals the column count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawColumns", into = "RawColumns")]
pub struct Columns {
    columns: Vec<Column>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            columns: vec![Column::default(), Column::default()],
        }
    }
}

impl Columns {
    /// Empty container with `count` columns
    pub fn new(count: u8) -> Result<Self, InvalidColumnCount> {
        Self::default().resized(count)
    }

    pub fn column_count(&self) -> u8 {
        // Bounded by COLUMN_COUNTS
        self.columns.len() as u8
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    /// Copy with a new column count. Columns whose index survives keep
    /// their contents; new columns start empty.
    pub fn resized(&self, count: u8) -> Result<Self, InvalidColumnCount> {
        if !COLUMN_COUNTS.contains(&count) {
            return Err(InvalidColumnCount(count));
        }

        let mut columns = self.columns.clone();
        columns.resize_with(count as usize, Column::default);
        Ok(Self { columns })
    }

    /// Total blocks across all columns
    pub fn block_count(&self) -> usize {
        self.columns.iter().map(|c| c.blocks.len()).sum()
    }
}

/// Column count outside [`COLUMN_COUNTS`]
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Unsupported column count: {0} (expected 2, 3 or 4)")]
pub struct InvalidColumnCount(pub u8);

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawColumns {
    column_count: u8,
    #[serde(default)]
    columns: Vec<Column>,
}

impl TryFrom<RawColumns> for Columns {
    type Error = InvalidColumnCount;

    fn try_from(raw: RawColumns) -> Result<Self, Self::Error> {
        // Stored column lists are padded or truncated to the declared count
        Columns { columns: raw.columns }.resized(raw.column_count)
    }
}

impl From<Columns> for RawColumns {
    fn from(columns: Columns) -> Self {
        RawColumns {
            column_count: columns.column_count(),
            columns: columns.columns,
        }
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_per_kind() {
        assert_eq!(Block::new(BlockKind::Heading), Block::heading("Heading", 2));
        assert_eq!(
            Block::new(BlockKind::Paragraph),
            Block::paragraph("Start writing...")
        );

        match Block::new(BlockKind::Image) {
            Block::Image(image) => {
                assert!(image.src.is_empty());
                assert!(image.alt.is_empty());
                assert!(image.caption.is_empty());
            }
            other => panic!("Expected image, got {:?}", other),
        }

        let columns = Block::new(BlockKind::Columns);
        let columns = columns.as_columns().unwrap();
        assert_eq!(columns.column_count(), 2);
        assert_eq!(columns.block_count(), 0);
    }

    #[test]
    fn test_block_wire_shape() {
        let value = serde_json::to_value(Block::heading("Hello", 2)).unwrap();
        assert_eq!(
            value,
            json!({"type": "Heading", "props": {"text": "Hello", "level": 2}})
        );

        let columns = serde_json::to_value(Block::new(BlockKind::Columns)).unwrap();
        assert_eq!(
            columns,
            json!({
                "type": "Columns",
                "props": {"columnCount": 2, "columns": [{"blocks": []}, {"blocks": []}]}
            })
        );
    }

    #[test]
    fn test_columns_padded_to_declared_count() {
        let block: Block = serde_json::from_value(json!({
            "type": "Columns",
            "props": {"columnCount": 3, "columns": [{"blocks": [{"type": "Paragraph", "props": {"text": "a"}}]}]}
        }))
        .unwrap();

        let columns = block.as_columns().unwrap();
        assert_eq!(columns.column_count(), 3);
        assert_eq!(columns.column(0).unwrap().blocks.len(), 1);
        assert!(columns.column(2).unwrap().blocks.is_empty());
    }

    #[test]
    fn test_columns_reject_unsupported_count() {
        let result: Result<Block, _> = serde_json::from_value(json!({
            "type": "Columns",
            "props": {"columnCount": 7, "columns": []}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_resize_preserves_surviving_columns() {
        let mut columns = Columns::new(3).unwrap();
        columns.column_mut(0).unwrap().blocks.push(Block::paragraph("left"));
        columns.column_mut(2).unwrap().blocks.push(Block::paragraph("right"));

        let shrunk = columns.resized(2).unwrap();
        assert_eq!(shrunk.column_count(), 2);
        assert_eq!(shrunk.column(0), columns.column(0));
        assert_eq!(shrunk.block_count(), 1);

        let grown = shrunk.resized(4).unwrap();
        assert_eq!(grown.column(0), columns.column(0));
        assert_eq!(grown.column(1), columns.column(1));
        assert!(grown.column(3).unwrap().blocks.is_empty());

        assert_eq!(columns.resized(5), Err(InvalidColumnCount(5)));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("RichText".parse::<BlockKind>(), Ok(BlockKind::RichText));
        assert_eq!("rich-text".parse::<BlockKind>(), Ok(BlockKind::RichText));
        assert_eq!("heading".parse::<BlockKind>(), Ok(BlockKind::Heading));
        assert!("video".parse::<BlockKind>().is_err());
    }

    #[test]
    fn test_summary_strips_markup() {
        let block = Block::RichText(RichText {
            html: "<p>Hello <b>world</b></p>".to_string(),
        });
        assert_eq!(block.summary(), "Hello world");
    }
}
