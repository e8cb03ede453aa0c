//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers: batch export with persistent
//! sequencing, single-task fetch, offline rendering of saved JSON, and shell
//! completion generation.

use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::Error;
use crate::fetch::{parse_identifier, resolve_api_key, resolve_team_id, ClickUpClient};
use crate::layout::{Document, TextSink};
use crate::outputs::{choose_stem, next_sequence, sequence_basename};
use crate::render::assemble;
use crate::task::Task;

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one or more tasks and write paired raw-JSON and block-stream
    /// files into a sequenced outputs directory.
    Export {
        /// Task URLs, custom ids (e.g. PERSON-20340), or numeric task ids.
        #[arg(required = true)]
        identifiers: Vec<String>,
        /// Output directory.
        #[arg(long, default_value = "outputs")]
        outputs: PathBuf,
        /// Do NOT request the markdown description.
        #[arg(long)]
        no_markdown: bool,
        /// Also write a plain-text preview next to each document.
        #[arg(long)]
        text: bool,
    },

    /// Fetch a single task and save its raw JSON.
    Fetch {
        /// Task URL, custom id, or numeric task id.
        identifier: String,
        /// Output JSON file.
        #[arg(long, default_value = "task_data.json")]
        out: PathBuf,
        /// Do NOT request the markdown description.
        #[arg(long)]
        no_markdown: bool,
    },

    /// Render a saved task JSON into a layout block stream (offline).
    Render {
        /// Path to the task JSON.
        #[arg(long = "in", default_value = "task_data.json")]
        input: PathBuf,
        /// Output path (default: input path with a .blocks.json extension).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write a plain-text preview.
        #[arg(long)]
        text: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Batch export: every identifier becomes a `NNNN - <stem>` file pair.
/// Failures are collected per identifier so one bad task cannot sink the run.
pub fn cmd_export(
    api_key: Option<String>,
    team: Option<String>,
    identifiers: Vec<String>,
    outputs: PathBuf,
    no_markdown: bool,
    text: bool,
) {
    let client = make_client(api_key);
    if let Err(e) = fs::create_dir_all(&outputs) {
        eprintln!("Failed to create {}: {e}", outputs.display());
        std::process::exit(1);
    }

    let mut seq = next_sequence(&outputs);
    let mut created: Vec<PathBuf> = Vec::new();
    let mut failures: Vec<String> = Vec::new();

    for raw in &identifiers {
        match export_one(&client, team.as_deref(), raw, &outputs, seq, no_markdown, text) {
            Ok(files) => {
                created.extend(files);
                seq += 1;
            }
            Err(e) => failures.push(format!("{raw} -> {e}")),
        }
    }

    if !created.is_empty() {
        println!("Created the following files:");
        for path in &created {
            println!("  {}", path.display());
        }
        println!("Directory: {}", outputs.display());
    }
    if !failures.is_empty() {
        eprintln!("Some items failed:");
        for line in &failures {
            eprintln!("  {line}");
        }
        std::process::exit(1);
    }
}

fn export_one(
    client: &ClickUpClient,
    team_flag: Option<&str>,
    raw: &str,
    outputs: &Path,
    seq: u32,
    no_markdown: bool,
    text: bool,
) -> Result<Vec<PathBuf>, Error> {
    let (url_team, key) = parse_identifier(raw);
    let team = resolve_team_id(url_team, team_flag);
    let value = client.fetch_task(&key, team.as_deref(), !no_markdown)?;
    let task = Task::from_value(value.clone())?;

    let stem = choose_stem(&key, task.name.as_deref().unwrap_or(""));
    let base = sequence_basename(seq, &stem);

    let json_path = outputs.join(format!("{base}.json"));
    write_file(&json_path, &to_pretty(&value)?)?;

    let doc = Document::new(&task, assemble(&task));
    let blocks_path = outputs.join(format!("{base}.blocks.json"));
    write_file(&blocks_path, &to_pretty(&doc)?)?;

    let mut files = vec![json_path, blocks_path];
    if text {
        let text_path = outputs.join(format!("{base}.txt"));
        write_file(&text_path, &TextSink::render(&doc.blocks))?;
        files.push(text_path);
    }
    Ok(files)
}

/// Fetch a single task and save the raw JSON, with a short summary.
pub fn cmd_fetch(
    api_key: Option<String>,
    team: Option<String>,
    identifier: String,
    out: PathBuf,
    no_markdown: bool,
) {
    let client = make_client(api_key);
    let (url_team, key) = parse_identifier(&identifier);
    let team = resolve_team_id(url_team, team.as_deref());

    let value = match client.fetch_task(&key, team.as_deref(), !no_markdown) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let pretty = match to_pretty(&value) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = write_file(&out, &pretty) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let title = value
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("(no name)");
    println!("Fetched task");
    if let Some(team) = team {
        println!("  team_id: {team}");
    }
    println!("  key/id : {key}");
    println!("  title  : {title}");
    println!("Saved to {}", out.display());
}

/// Offline render of an already-saved task JSON.
pub fn cmd_render(input: PathBuf, out: Option<PathBuf>, text: bool) {
    let raw = match fs::read_to_string(&input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", input.display());
            std::process::exit(1);
        }
    };
    let task = match Task::from_json(&raw) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Invalid task json in {}: {e}", input.display());
            std::process::exit(1);
        }
    };

    let doc = Document::new(&task, assemble(&task));
    let out_path = out.unwrap_or_else(|| input.with_extension("blocks.json"));

    let result = to_pretty(&doc).and_then(|pretty| write_file(&out_path, &pretty));
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
    println!("Blocks written to {}", out_path.display());

    if text {
        let text_path = out_path.with_extension("txt");
        if let Err(e) = write_file(&text_path, &TextSink::render(&doc.blocks)) {
            eprintln!("{e}");
            std::process::exit(1);
        }
        println!("Preview written to {}", text_path.display());
    }
}

/// Generate shell completion scripts on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

fn make_client(api_key: Option<String>) -> ClickUpClient {
    let api_key = match resolve_api_key(api_key) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    match ClickUpClient::new(api_key) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, Error> {
    let mut pretty = serde_json::to_string_pretty(value)?;
    pretty.push('\n');
    Ok(pretty)
}

fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}
