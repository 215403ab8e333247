use std::sync::LazyLock;

use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{ToolError, ToolResult};
use crate::http;

static HYDRATER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.SVELTE_HYDRATER.contents").expect("valid hydrater selector")
});

#[derive(Deserialize)]
struct SearchHit {
    id: Option<String>,
    paper: Option<PaperSummary>,
}

#[derive(Deserialize)]
struct PaperSummary {
    id: String,
}

pub struct HuggingFaceClient {
    http: Client,
    base_url: String,
}

impl HuggingFaceClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base_url: config.hugging_face_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn top_daily_paper(&self) -> ToolResult<Option<String>> {
        let url = format!("{}/papers", self.base_url);
        tracing::info!(%url, "fetching daily papers");

        let html = http::send(self.http.get(&url)).await?.text().await?;
        Ok(top_daily_paper_title(&html))
    }

    pub async fn paper_id_by_title(&self, title: &str) -> ToolResult<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ToolError::invalid_input("paper title must not be empty"));
        }
        tracing::info!(title, "searching papers");

        let hits: Vec<SearchHit> = http::send(
            self.http
                .get(format!("{}/api/papers/search", self.base_url))
                .query(&[("q", title)]),
        )
        .await?
        .json()
        .await?;

        hits.into_iter()
            .next()
            .and_then(|hit| hit.id.or(hit.paper.map(|p| p.id)))
            .ok_or_else(|| ToolError::not_found(format!("no paper matching title {:?}", title)))
    }
}

/// Scans every hydration container and takes the first `dailyPapers` entry's
/// title from each one that parses. When several containers carry daily
/// papers the last one wins. Containers with malformed JSON are skipped.
pub fn top_daily_paper_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut top = None;

    for container in document.select(&HYDRATER) {
        let Some(props) = container.value().attr("data-props") else {
            continue;
        };

        // attribute values arrive entity-decoded; double-escaped quotes do not
        let props = props.replace("&quot;", "\"");
        let state: serde_json::Value = match serde_json::from_str(&props) {
            Ok(state) => state,
            Err(err) => {
                tracing::debug!(%err, "skipping container with malformed props");
                continue;
            }
        };

        let Some(first) = state.get("dailyPapers").and_then(|papers| papers.get(0)) else {
            continue;
        };

        let title = first
            .get("title")
            .or_else(|| first.get("paper").and_then(|paper| paper.get("title")))
            .and_then(serde_json::Value::as_str);

        if let Some(title) = title {
            top = Some(title.to_string());
        }
    }

    top
}
