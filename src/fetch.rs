//! ClickUp API collaborator.
//!
//! Accepts a task URL, a custom id (e.g. `PERSON-20340`) or a raw numeric
//! task id, and fetches the task JSON. Custom ids need a team id, resolved
//! with the priority: URL segment, then `--team`, then `CLICKUP_TEAM_ID`.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::Error;

const API_BASE: &str = "https://api.clickup.com/api/v2/task";

/// Task URLs: `https://app.clickup.com/t/<team>/<KEY>` or `.../t/<KEY>`.
static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(?:app\.)?clickup\.com/t(?:/(\d+))?/([^/?#]+)")
        .expect("valid identifier regex")
});

/// Split an identifier into (team id from the URL, task key). Anything that
/// is not a task URL is passed through as a bare key.
pub fn parse_identifier(raw: &str) -> (Option<String>, String) {
    let raw = raw.trim();
    match IDENTIFIER_RE.captures(raw) {
        Some(c) => (
            c.get(1).map(|m| m.as_str().to_string()),
            c[2].to_string(),
        ),
        None => (None, raw.to_string()),
    }
}

/// Pure digits mean a real task id; anything else is a custom id.
pub fn is_custom_id(key: &str) -> bool {
    key.is_empty() || !key.chars().all(|c| c.is_ascii_digit())
}

/// API key from the command line or `CLICKUP_API_KEY`.
pub fn resolve_api_key(cli_key: Option<String>) -> Result<String, Error> {
    cli_key
        .or_else(|| std::env::var("CLICKUP_API_KEY").ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or(Error::MissingApiKey)
}

/// Team id priority: URL segment, then `--team`, then `CLICKUP_TEAM_ID`.
pub fn resolve_team_id(url_team: Option<String>, cli_team: Option<&str>) -> Option<String> {
    url_team
        .or_else(|| cli_team.map(str::to_string))
        .or_else(|| std::env::var("CLICKUP_TEAM_ID").ok())
        .filter(|t| !t.trim().is_empty())
}

/// Thin blocking client around the task endpoint.
pub struct ClickUpClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl ClickUpClient {
    pub fn new(api_key: String) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(ClickUpClient { http, api_key })
    }

    /// Fetch one task as raw JSON. Custom ids require a team id; numeric ids
    /// ignore it.
    pub fn fetch_task(
        &self,
        key: &str,
        team_id: Option<&str>,
        include_markdown: bool,
    ) -> Result<Value, Error> {
        let custom = is_custom_id(key);
        if custom && team_id.is_none() {
            return Err(Error::MissingTeamId(key.to_string()));
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        if custom {
            params.push(("custom_task_ids", "true".to_string()));
            if let Some(team) = team_id {
                params.push(("team_id", team.to_string()));
            }
        }
        if include_markdown {
            params.push(("include_markdown_description", "true".to_string()));
        }

        let response = self
            .http
            .get(format!("{API_BASE}/{key}"))
            .header("Authorization", &self.api_key)
            .query(&params)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Api {
                key: key.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json()?)
    }
}
