use clap::Parser;

use crate::cmd::Commands;

/// ClickUp task exporter CLI.
/// Credentials come from --api-key/--team or the CLICKUP_API_KEY and
/// CLICKUP_TEAM_ID environment variables.
#[derive(Parser)]
#[command(
    name = "cupdf",
    version,
    about = "Fetch ClickUp tasks and render them as paginated documents"
)]
pub struct Cli {
    /// Override CLICKUP_API_KEY from the environment.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Team id (needed for custom task ids unless embedded in the URL).
    #[arg(long, global = true)]
    pub team: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
