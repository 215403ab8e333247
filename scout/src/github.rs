use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ToolError, ToolResult};
use crate::http;

pub const INVALID_URL: &str = "Invalid GitHub URL format";

const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[:/]([^/]+)/([^/]+?)(?:\.git)?$").expect("valid repository pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(url: &str) -> ToolResult<Self> {
        let captures = REPO_URL
            .captures(url.trim())
            .ok_or_else(|| ToolError::invalid_input(INVALID_URL))?;

        Ok(Self {
            owner: captures[1].to_string(),
            name: captures[2].to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One entry of a recursive git tree listing. Upstream fields beyond `path`
/// and `type` pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

pub struct GitHubClient {
    http: Client,
    api_url: String,
    raw_url: String,
}

impl GitHubClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            raw_url: config.github_raw_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.api_url, path))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    pub async fn repo_info(&self, url: &str) -> ToolResult<serde_json::Value> {
        let repo = RepoRef::parse(url)?;
        tracing::info!(%repo, "fetching repository info");

        let response = http::send(self.api_get(&format!("/repos/{}", repo))).await?;
        Ok(response.json().await?)
    }

    pub async fn repo_structure(&self, url: &str) -> ToolResult<Vec<TreeEntry>> {
        let repo = RepoRef::parse(url)?;
        tracing::info!(%repo, "fetching repository tree");

        let response = self
            .with_branch_fallback(|branch| {
                self.api_get(&format!("/repos/{}/git/trees/{}", repo, branch))
                    .query(&[("recursive", "1")])
            })
            .await?;

        let tree: TreeResponse = response.json().await?;
        if tree.truncated {
            tracing::warn!(
                %repo,
                entries = tree.tree.len(),
                "tree listing was truncated upstream"
            );
        }

        Ok(tree.tree)
    }

    pub async fn file_content(&self, url: &str, path: &str) -> ToolResult<String> {
        let repo = RepoRef::parse(url)?;
        let path = path.trim_start_matches('/');
        tracing::info!(%repo, path, "fetching file content");

        let response = self
            .with_branch_fallback(|branch| {
                self.http
                    .get(format!("{}/{}/{}/{}", self.raw_url, repo, branch, path))
            })
            .await?;

        Ok(response.text().await?)
    }

    /// Tries each default branch in turn; only an upstream status failure
    /// moves on to the next one. The last failure is returned.
    async fn with_branch_fallback<F>(&self, request: F) -> ToolResult<reqwest::Response>
    where
        F: Fn(&str) -> reqwest::RequestBuilder,
    {
        let mut last_err = None;

        for branch in DEFAULT_BRANCHES {
            match http::send(request(branch)).await {
                Ok(response) => return Ok(response),
                Err(err @ ToolError::Upstream { .. }) => {
                    tracing::debug!(branch, "branch request failed, trying next");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or_else(|| ToolError::not_found("default branch")))
    }
}
