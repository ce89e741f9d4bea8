//! # Public HTML Rendering
//!
//! Turns a document into the markup shown on the public article page.

use crate::block::Block;
use crate::document::Document;

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
        self.buffer.push_str(text);
        if self.options.pretty {
            self.buffer.push('\n');
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Render with default options
pub fn render_html(doc: &Document) -> String {
    render_html_with(doc, &HtmlOptions::default())
}

pub fn render_html_with(doc: &Document, options: &HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    for block in &doc.content {
        render_block(block, &mut ctx);
    }
    ctx.buffer
}

fn render_block(block: &Block, ctx: &mut Context<'_>) {
    match block {
        Block::Heading(heading) => {
            let level = heading.level.clamp(1, 6);
            ctx.add_line(&format!("<h{0}>{1}</h{0}>", level, escape_html(&heading.text)));
        }
        Block::Paragraph(paragraph) => {
            ctx.add_line(&format!("<p>{}</p>", escape_html(&paragraph.text)));
        }
        Block::RichText(rich) => {
            // Authored markup from the rich-text control is emitted as-is
            ctx.add_line(&format!("<div class=\"rich-text\">{}</div>", rich.html));
        }
        Block::Image(image) if image.src.is_empty() => {}
        Block::Image(image) => {
            ctx.add_line("<figure>");
            ctx.indent();
            ctx.add_line(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_html(&image.src),
                escape_html(&image.alt)
            ));
            if !image.caption.is_empty() {
                ctx.add_line(&format!("<figcaption>{}</figcaption>", escape_html(&image.caption)));
            }
            ctx.dedent();
            ctx.add_line("</figure>");
        }
        Block::Columns(columns) => {
            ctx.add_line(&format!(
                "<div class=\"columns columns-{}\">",
                columns.column_count()
            ));
            ctx.indent();
            for column in columns.columns() {
                ctx.add_line("<div class=\"column\">");
                ctx.indent();
                for child in &column.blocks {
                    render_block(child, ctx);
                }
                ctx.dedent();
                ctx.add_line("</div>");
            }
            ctx.dedent();
            ctx.add_line("</div>");
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, Columns, Image};

    #[test]
    fn test_headings_and_paragraphs_escaped() {
        let doc = Document::with_blocks(vec![
            Block::heading("Tom & Jerry", 1),
            Block::paragraph("<script>alert('x')</script>"),
        ]);

        let html = render_html(&doc);
        assert!(html.contains("<h1>Tom &amp; Jerry</h1>"));
        assert!(html.contains("<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"));
    }

    #[test]
    fn test_empty_image_omitted() {
        let doc = Document::with_blocks(vec![Block::new(BlockKind::Image)]);
        assert_eq!(render_html(&doc), "");
    }

    #[test]
    fn test_image_with_caption() {
        let doc = Document::with_blocks(vec![Block::Image(Image {
            src: "/uploads/a.png".to_string(),
            alt: "A \"cat\"".to_string(),
            caption: "Our cat".to_string(),
        })]);

        let html = render_html(&doc);
        assert!(html.contains("<img src=\"/uploads/a.png\" alt=\"A &quot;cat&quot;\">"));
        assert!(html.contains("<figcaption>Our cat</figcaption>"));
    }

    #[test]
    fn test_columns_nest() {
        let mut columns = Columns::new(3).unwrap();
        columns.column_mut(2).unwrap().blocks.push(Block::paragraph("right"));
        let doc = Document::with_blocks(vec![Block::Columns(columns)]);

        let options = HtmlOptions {
            pretty: false,
            ..HtmlOptions::default()
        };
        assert_eq!(
            render_html_with(&doc, &options),
            "<div class=\"columns columns-3\"><div class=\"column\"></div><div class=\"column\"></div><div class=\"column\"><p>right</p></div></div>"
        );
    }
}
