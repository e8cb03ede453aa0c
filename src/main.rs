//! # cupdf - ClickUp task → document exporter
//!
//! A command-line tool that fetches tasks from the ClickUp API and renders
//! them into ordered streams of typed layout blocks, ready for an external
//! typesetter to paginate into PDFs.
//!
//! ## Key Features
//!
//! - **Rich-content rendering**: interprets ClickUp's Quill-delta rich text
//!   (headings, bullets, inline styles, task mentions, embedded images) and
//!   the markdown description fallback into one deterministic block stream.
//! - **Cross-reference resolution**: task mentions and task links are
//!   re-labelled uniformly (`[CUSTOM-ID] Task name`) from a per-document
//!   lookup built by pre-scanning every field, keyed by numeric id *and*
//!   custom id.
//! - **Fault-contained fields**: a malformed rich-text payload, unknown
//!   value shape, or unresolvable reference degrades that one field, never
//!   the document.
//! - **Persistent sequencing**: exports land as `NNNN - <key>__<title>`
//!   file pairs (raw JSON + block stream), numbered across runs.
//!
//! ## Quick Start
//!
//! ```bash
//! # Export one or more tasks into ./outputs
//! cupdf export https://app.clickup.com/t/20419954/PERSON-20340
//!
//! # Fetch raw JSON only
//! cupdf fetch PERSON-20340 --team 20419954 --out task_data.json
//!
//! # Render a saved JSON offline, with a plain-text preview
//! cupdf render --in task_data.json --text
//! ```
//!
//! The API key comes from `--api-key` or the `CLICKUP_API_KEY` environment
//! variable; custom task ids also need a team id (`--team`,
//! `CLICKUP_TEAM_ID`, or a URL containing `/t/<team>/<id>`).

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod delta;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod layout;
pub mod lookup;
pub mod markdown;
pub mod markup;
pub mod outputs;
pub mod render;
pub mod task;

use cli::Cli;
use cmd::*;

fn main() {
    // Degradations (skipped payloads, index collisions) surface on stderr;
    // RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export {
            identifiers,
            outputs,
            no_markdown,
            text,
        } => cmd_export(cli.api_key, cli.team, identifiers, outputs, no_markdown, text),

        Commands::Fetch {
            identifier,
            out,
            no_markdown,
        } => cmd_fetch(cli.api_key, cli.team, identifier, out, no_markdown),

        Commands::Render { input, out, text } => cmd_render(input, out, text),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
