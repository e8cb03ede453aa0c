//! Output directory naming and sequencing.
//!
//! Exports land in a flat directory as `NNNN - <key>__<short-title>.<ext>`
//! pairs. The sequence counter is persistent by construction: it is
//! recovered by scanning the directory for already-numbered files.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static SEQUENCED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{4})\s*-\s*(.+)\.(json|txt)$").expect("valid sequence regex")
});

/// Next free sequence number for a directory (1 when empty or missing).
pub fn next_sequence(dir: &Path) -> u32 {
    let mut max_seq = 0;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(caps) = SEQUENCED_NAME_RE.captures(name) {
                if let Ok(n) = caps[1].parse::<u32>() {
                    max_seq = max_seq.max(n);
                }
            }
        }
    }
    max_seq + 1
}

/// Collapse anything that is not filename-safe into single underscores.
pub fn sanitize_basename(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let collapsed = replaced
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let trimmed: String = collapsed.chars().take(120).collect();
    if trimmed.is_empty() {
        "task".to_string()
    } else {
        trimmed
    }
}

/// Build the file stem `<key>__<short-title>`, falling back to the key alone
/// for unnamed tasks.
pub fn choose_stem(key: &str, title: &str) -> String {
    let short = truncate(title.trim(), 60);
    let stem = if short.is_empty() {
        key.to_string()
    } else {
        format!("{key}__{short}")
    };
    sanitize_basename(&stem)
}

/// Prefix a stem with its zero-padded sequence number.
pub fn sequence_basename(seq: u32, stem: &str) -> String {
    format!("{seq:04} - {stem}")
}

/// Truncate to a maximum number of characters.
fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}
