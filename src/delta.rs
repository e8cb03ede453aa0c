//! Quill-delta interpreter: ordered insert ops in, ordered layout blocks out.
//!
//! ClickUp serialises rich text as a delta: a list of insert operations
//! carrying character attributes (bold, italic, link) and block attributes
//! (header, list, code-block). Block attributes sit on the *newline* op, not
//! on the text before it, so the interpreter buffers the current line and
//! only decides its block type when the newline arrives.

use serde::Deserialize;
use serde_json::Value;

use crate::layout::{Block, HeadingLevel, StyleId};
use crate::lookup::TaskLookup;
use crate::markup::{canonical_task_url, chip_label, esc};

/// Default edge for embedded images, in points (2 inches).
pub const IMAGE_EDGE: f32 = 144.0;

/// A parsed rich-text payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaDoc {
    #[serde(default)]
    pub ops: Vec<DeltaOp>,
}

/// One insert operation.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaOp {
    #[serde(default)]
    pub insert: Option<Insert>,
    #[serde(default, deserialize_with = "null_attributes")]
    pub attributes: Attributes,
}

/// ClickUp occasionally exports `"attributes": null`; treat it as absent.
fn null_attributes<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

/// The inserted content: a text run or a structured embed.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Insert {
    Text(String),
    Mention { task_mention: TaskMention },
    Image { image: String },
    /// Embeds this renderer does not know. Kept so one exotic op cannot fail
    /// the whole payload.
    Other(Value),
}

/// An embedded reference to another task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskMention {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Character- and block-level attributes of an op.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub header: Option<u8>,
    #[serde(default)]
    pub list: Option<ListAttr>,
    #[serde(default, rename = "code-block")]
    pub code_block: Option<Value>,
}

impl Attributes {
    pub fn is_bullet(&self) -> bool {
        self.list.as_ref().map(ListAttr::kind) == Some("bullet")
    }

    pub fn is_code(&self) -> bool {
        match &self.code_block {
            None | Some(Value::Bool(false)) | Some(Value::Null) => false,
            Some(_) => true,
        }
    }
}

/// The list attribute is exported either as `"bullet"` or, in some payloads,
/// as a nested `{"list": "bullet"}` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListAttr {
    Kind(String),
    Nested { list: String },
}

impl ListAttr {
    pub fn kind(&self) -> &str {
        match self {
            ListAttr::Kind(k) => k,
            ListAttr::Nested { list } => list,
        }
    }
}

/// Parse a serialised rich-text payload.
pub fn parse_delta(raw: &str) -> Result<DeltaDoc, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Apply character-level formatting to one run of text. Escapes first, then
/// bold, then italic, with the hyperlink outermost so the whole styled run
/// is clickable. A link whose visible text is empty shows the URL instead.
pub fn wrap_inline(text: &str, attrs: &Attributes) -> String {
    let mut t = esc(text);
    if let Some(link) = attrs.link.as_deref() {
        let href = esc(link.trim());
        if !href.is_empty() {
            if t.trim().is_empty() {
                t = href.clone();
            }
            if attrs.bold {
                t = format!("<b>{t}</b>");
            }
            if attrs.italic {
                t = format!("<i>{t}</i>");
            }
            return format!(r#"<a href="{href}">{t}</a>"#);
        }
    }
    if attrs.bold {
        t = format!("<b>{t}</b>");
    }
    if attrs.italic {
        t = format!("<i>{t}</i>");
    }
    t
}

/// Interpret a delta op sequence into layout blocks.
pub fn render_ops(ops: &[DeltaOp], lookup: &TaskLookup) -> Vec<Block> {
    let mut state = Interpreter::default();
    for op in ops {
        match &op.insert {
            None => {}
            Some(Insert::Text(text)) => state.text(text, &op.attributes),
            Some(Insert::Mention { task_mention }) => state.mention(task_mention, lookup),
            Some(Insert::Image { image }) => state.image(image),
            Some(Insert::Other(_)) => {}
        }
    }
    state.finish()
}

/// Explicit interpreter state: the accumulating line and the pending bullet
/// group, threaded through a single pass.
#[derive(Debug, Default)]
struct Interpreter {
    line: String,
    bullets: Vec<String>,
    blocks: Vec<Block>,
}

impl Interpreter {
    fn text(&mut self, text: &str, attrs: &Attributes) {
        if text == "\n" {
            // Block attributes ride on the newline op.
            self.close_line(attrs);
            return;
        }
        if text.contains('\n') {
            // Newlines embedded in a longer run carry no block attributes.
            let parts: Vec<&str> = text.split('\n').collect();
            let (last, init) = parts.split_last().expect("split always yields one part");
            for part in init {
                self.push_run(part, attrs);
                self.close_line(&Attributes::default());
            }
            self.push_run(last, attrs);
        } else {
            self.push_run(text, attrs);
        }
    }

    fn push_run(&mut self, text: &str, attrs: &Attributes) {
        if text.is_empty() && attrs.link.is_none() {
            return;
        }
        self.line.push_str(&wrap_inline(text, attrs));
    }

    /// Close the buffered line as a block, honouring the newline op's block
    /// attributes.
    fn close_line(&mut self, attrs: &Attributes) {
        let raw = std::mem::take(&mut self.line);
        if attrs.is_bullet() {
            let item = raw.trim();
            if !item.is_empty() {
                self.bullets.push(item.to_string());
            }
            return;
        }
        self.flush_bullets();
        let text = raw.trim();
        if text.is_empty() {
            self.blocks.push(Block::spacer(2.0));
        } else if let Some(depth) = attrs.header {
            self.blocks
                .push(Block::heading(HeadingLevel::from_depth(depth), text));
        } else if attrs.is_code() {
            self.blocks.push(Block::Paragraph {
                markup: text.to_string(),
                style: StyleId::Code,
            });
        } else {
            self.blocks.push(Block::paragraph(text));
        }
    }

    /// Embeds interrupt the line: whatever is buffered is emitted first so
    /// ordering is preserved, then accumulation continues after the embed.
    fn break_line(&mut self) {
        if self.line.trim().is_empty() {
            self.line.clear();
        } else {
            self.close_line(&Attributes::default());
        }
        self.flush_bullets();
    }

    fn mention(&mut self, mention: &TaskMention, lookup: &TaskLookup) {
        let tid = match mention.task_id.as_deref().filter(|t| !t.is_empty()) {
            Some(t) => t,
            // A mention with no target renders nothing.
            None => return,
        };
        self.break_line();
        let display_id = mention
            .custom_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(tid);
        let name = mention
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| lookup.display(tid).1);
        self.blocks.push(Block::Button {
            label: chip_label(display_id, &name),
            url: canonical_task_url(tid),
        });
        self.blocks.push(Block::spacer(4.0));
    }

    fn image(&mut self, url: &str) {
        self.break_line();
        self.blocks.push(Block::Image {
            url: url.to_string(),
            width: IMAGE_EDGE,
            height: IMAGE_EDGE,
        });
    }

    fn flush_bullets(&mut self) {
        if !self.bullets.is_empty() {
            let items = std::mem::take(&mut self.bullets);
            self.blocks.push(Block::BulletList { items });
        }
    }

    fn finish(mut self) -> Vec<Block> {
        if !self.line.trim().is_empty() {
            self.close_line(&Attributes::default());
        }
        self.flush_bullets();
        self.blocks.push(Block::spacer(4.0));
        self.blocks
    }
}
