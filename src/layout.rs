//! Layout blocks and the style configuration handed to the typesetter.
//!
//! The renderer never draws anything. It produces an ordered stream of typed
//! blocks; pagination, font metrics and byte emission belong to an external
//! engine that consumes the serialised `Document`. A small plain-text sink is
//! included for previews.

use serde::{Deserialize, Serialize};

use crate::markup::strip_markup;
use crate::task::Task;

/// Heading depth. Anything deeper than three renders at three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_depth(depth: u8) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

/// Named paragraph styles. Presentation attributes live in [`Stylesheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleId {
    Body,
    Meta,
    Link,
    Warn,
    Code,
}

/// One typed layout block. Produced in order, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Block {
    Heading { level: HeadingLevel, markup: String },
    Paragraph { markup: String, style: StyleId },
    BulletList { items: Vec<String> },
    Button { label: String, url: String },
    Image { url: String, width: f32, height: f32 },
    Spacer { height: f32 },
}

impl Block {
    /// Body-styled paragraph.
    pub fn paragraph(markup: impl Into<String>) -> Self {
        Block::Paragraph {
            markup: markup.into(),
            style: StyleId::Body,
        }
    }

    pub fn heading(level: HeadingLevel, markup: impl Into<String>) -> Self {
        Block::Heading {
            level,
            markup: markup.into(),
        }
    }

    pub fn spacer(height: f32) -> Self {
        Block::Spacer { height }
    }
}

/// Presentation attributes for one named style, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: String,
    pub size: f32,
    pub leading: f32,
    pub colour: String,
    pub space_before: f32,
    pub space_after: f32,
}

impl TextStyle {
    fn new(font: &str, size: f32, leading: f32, colour: &str) -> Self {
        TextStyle {
            font: font.to_string(),
            size,
            leading,
            colour: colour.to_string(),
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }
}

const BLUE: &str = "#1f6feb";
const RED: &str = "#c62828";
const GREY: &str = "#555555";

/// Full style enumeration shipped alongside the blocks, so the typesetter
/// needs no configuration of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub h1: TextStyle,
    pub h2: TextStyle,
    pub h3: TextStyle,
    pub body: TextStyle,
    pub meta: TextStyle,
    pub link: TextStyle,
    pub warn: TextStyle,
    pub button: TextStyle,
    pub code: TextStyle,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Stylesheet {
            h1: TextStyle::new("Helvetica-Bold", 20.0, 24.0, BLUE).spacing(10.0, 6.0),
            h2: TextStyle::new("Helvetica-Bold", 16.0, 20.0, BLUE).spacing(10.0, 4.0),
            h3: TextStyle::new("Helvetica-Bold", 13.0, 17.0, BLUE).spacing(8.0, 3.0),
            body: TextStyle::new("Helvetica", 10.5, 14.0, "#000000").spacing(0.0, 4.0),
            meta: TextStyle::new("Helvetica", 9.0, 12.0, GREY).spacing(0.0, 2.0),
            link: TextStyle::new("Helvetica", 9.0, 12.0, BLUE).spacing(0.0, 2.0),
            warn: TextStyle::new("Helvetica-Oblique", 10.5, 14.0, RED).spacing(0.0, 3.0),
            button: TextStyle::new("Helvetica-Bold", 10.0, 13.0, BLUE).spacing(2.0, 2.0),
            code: TextStyle::new("Courier", 9.0, 12.0, "#000000").spacing(2.0, 4.0),
        }
    }
}

/// The artifact handed to the external typesetter: the document title, the
/// style configuration, and the ordered block stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub styles: Stylesheet,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(task: &Task, blocks: Vec<Block>) -> Self {
        Document {
            title: task.display_name().to_string(),
            styles: Stylesheet::default(),
            blocks,
        }
    }
}

/// Renders a block stream as plain text. Useful as a quick preview and as the
/// degraded form of blocks the typesetter would need assets for: images come
/// out as a `[image: <url>]` placeholder here.
#[derive(Debug, Default)]
pub struct TextSink {
    out: String,
}

impl TextSink {
    pub fn new() -> Self {
        TextSink::default()
    }

    pub fn emit(&mut self, block: &Block) {
        match block {
            Block::Heading { level, markup } => {
                let text = strip_markup(markup);
                self.out
                    .push_str(&format!("{} {}\n", "#".repeat(level.depth() as usize), text));
            }
            Block::Paragraph { markup, style } => {
                let text = strip_markup(markup);
                match style {
                    StyleId::Code => {
                        for line in text.lines() {
                            self.out.push_str("    ");
                            self.out.push_str(line);
                            self.out.push('\n');
                        }
                    }
                    StyleId::Warn => self.out.push_str(&format!("! {text}\n")),
                    _ => self.out.push_str(&format!("{text}\n")),
                }
            }
            Block::BulletList { items } => {
                for item in items {
                    self.out.push_str(&format!("  - {}\n", strip_markup(item)));
                }
            }
            Block::Button { label, url } => {
                self.out.push_str(&format!("{} <{}>\n", strip_markup(label), url));
            }
            Block::Image { url, .. } => {
                self.out.push_str(&format!("[image: {url}]\n"));
            }
            Block::Spacer { .. } => self.out.push('\n'),
        }
    }

    pub fn render(blocks: &[Block]) -> String {
        let mut sink = TextSink::new();
        for block in blocks {
            sink.emit(block);
        }
        sink.finish()
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamps() {
        assert_eq!(HeadingLevel::from_depth(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(3), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_depth(6), HeadingLevel::H3);
    }

    #[test]
    fn test_text_sink_placeholders() {
        let blocks = vec![
            Block::heading(HeadingLevel::H2, "Title"),
            Block::Image {
                url: "https://example.com/p.png".into(),
                width: 144.0,
                height: 144.0,
            },
            Block::Paragraph {
                markup: "careful".into(),
                style: StyleId::Warn,
            },
        ];
        let text = TextSink::render(&blocks);
        assert_eq!(text, "## Title\n[image: https://example.com/p.png]\n! careful\n");
    }

    #[test]
    fn test_block_stream_round_trips_as_json() {
        let blocks = vec![
            Block::paragraph("hello <b>world</b>"),
            Block::Button {
                label: "[ABC-1] Fix bug".into(),
                url: "https://app.clickup.com/t/123".into(),
            },
            Block::spacer(4.0),
        ];
        let json = serde_json::to_string(&blocks).unwrap();
        let back: Vec<Block> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, blocks);
    }
}
