//! Error types for the fetch and file collaborators.
//!
//! The rendering core never fails: a bad field degrades into a fallback
//! block. Everything that *can* fail lives at the edges: talking to the
//! ClickUp API and reading/writing files.

use std::path::PathBuf;

/// Errors raised by the fetch/IO collaborators around the renderer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key on the command line or in the environment.
    #[error("missing API key: pass --api-key or set CLICKUP_API_KEY")]
    MissingApiKey,

    /// A custom task id was given without any way to resolve its team.
    #[error(
        "custom id '{0}' requires a team id: pass --team, set CLICKUP_TEAM_ID, \
         or use a URL containing /t/<team>/<id>"
    )]
    MissingTeamId(String),

    /// The ClickUp API answered with a non-success status.
    #[error("failed to fetch task '{key}': HTTP {status} - {body}")]
    Api {
        key: String,
        status: u16,
        body: String,
    },

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// File read/write failure.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A task JSON file that does not deserialise.
    #[error("invalid task json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
