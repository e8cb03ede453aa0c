//! Minimal markdown renderer for task descriptions.
//!
//! The ClickUp API returns `markdown_description` as lightweight markdown;
//! the plain `description` uses the same conventions informally. One pass
//! over the lines is enough for the subset that matters here: `#`-prefixed
//! headings, `-`/`*` bullets, blank-line spacing, and the inline
//! `[text](url)` / `**bold**` syntax.

use crate::layout::{Block, HeadingLevel};
use crate::markup::md_inline_to_html;

/// Render markdown-ish text into layout blocks.
pub fn render_markdown(text: &str) -> Vec<Block> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut blocks: Vec<Block> = Vec::new();
    let mut bullets: Vec<String> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();

        // Longest heading prefix first.
        if let Some(rest) = line.strip_prefix("### ") {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::heading(HeadingLevel::H3, md_inline_to_html(rest)));
            continue;
        }
        if let Some(rest) = line.strip_prefix("## ") {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::heading(HeadingLevel::H2, md_inline_to_html(rest)));
            continue;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::heading(HeadingLevel::H1, md_inline_to_html(rest)));
            continue;
        }

        let lead = line.trim_start();
        if let Some(item) = lead.strip_prefix("- ").or_else(|| lead.strip_prefix("* ")) {
            bullets.push(md_inline_to_html(item.trim()));
            continue;
        }

        if line.trim().is_empty() {
            flush_bullets(&mut blocks, &mut bullets);
            blocks.push(Block::spacer(4.0));
            continue;
        }

        flush_bullets(&mut blocks, &mut bullets);
        blocks.push(Block::paragraph(md_inline_to_html(line)));
    }

    flush_bullets(&mut blocks, &mut bullets);
    blocks
}

fn flush_bullets(blocks: &mut Vec<Block>, bullets: &mut Vec<String>) {
    if !bullets.is_empty() {
        blocks.push(Block::BulletList {
            items: std::mem::take(bullets),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_then_bullets() {
        let blocks = render_markdown("# Title\n\n- a\n- b\n");
        assert_eq!(
            blocks,
            vec![
                Block::heading(HeadingLevel::H1, "Title"),
                Block::spacer(4.0),
                Block::BulletList {
                    items: vec!["a".to_string(), "b".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_longest_heading_prefix_wins() {
        let blocks = render_markdown("### deep\n## mid\n");
        assert_eq!(blocks[0], Block::heading(HeadingLevel::H3, "deep"));
        assert_eq!(blocks[1], Block::heading(HeadingLevel::H2, "mid"));
    }

    #[test]
    fn test_paragraph_breaks_bullet_group() {
        let blocks = render_markdown("- a\ntext\n- b\n");
        assert_eq!(
            blocks,
            vec![
                Block::BulletList {
                    items: vec!["a".to_string()]
                },
                Block::paragraph("text"),
                Block::BulletList {
                    items: vec!["b".to_string()]
                },
            ]
        );
    }

    #[test]
    fn test_inline_syntax_in_paragraphs() {
        let blocks = render_markdown("see [docs](https://example.com) and **this**");
        assert_eq!(
            blocks[0],
            Block::paragraph(r#"see <a href="https://example.com">docs</a> and <b>this</b>"#)
        );
    }

    #[test]
    fn test_indented_star_bullets() {
        let blocks = render_markdown("  * one\n  * two");
        assert_eq!(
            blocks,
            vec![Block::BulletList {
                items: vec!["one".to_string(), "two".to_string()]
            }]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(render_markdown("   \n ").is_empty());
    }
}
