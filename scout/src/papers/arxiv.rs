use std::path::{Path, PathBuf};

use reqwest::Client;

use crate::config::Config;
use crate::error::{ToolError, ToolResult};
use crate::http;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

#[derive(Debug, Clone)]
pub struct PaperArtifact {
    pub paper_id: String,
    pub path: PathBuf,
    pub bytes: usize,
}

pub struct ArxivClient {
    http: Client,
    api_url: String,
}

impl ArxivClient {
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.arxiv_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn download(&self, paper_id: &str, dir: &Path) -> ToolResult<PaperArtifact> {
        let paper_id = paper_id.trim();
        if paper_id.is_empty() {
            return Err(ToolError::invalid_input("paper id must not be empty"));
        }

        let pdf_url = self.pdf_url(paper_id).await?;
        tracing::info!(paper_id, %pdf_url, "downloading paper");

        let bytes = http::send(self.http.get(&pdf_url)).await?.bytes().await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(artifact_file_name(paper_id));
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved paper");

        Ok(PaperArtifact {
            paper_id: paper_id.to_string(),
            path,
            bytes: bytes.len(),
        })
    }

    async fn pdf_url(&self, paper_id: &str) -> ToolResult<String> {
        let feed = http::send(
            self.http
                .get(format!("{}/query", self.api_url))
                .query(&[("id_list", paper_id), ("max_results", "1")]),
        )
        .await?
        .text()
        .await?;

        pdf_link_from_feed(&feed)?
            .ok_or_else(|| ToolError::not_found(format!("arXiv paper {}", paper_id)))
    }
}

/// Extracts the PDF link of the first entry of an arXiv Atom feed. The API
/// reports bad ids as an entry whose id lives under `/api/errors`.
pub fn pdf_link_from_feed(feed: &str) -> ToolResult<Option<String>> {
    let doc = roxmltree::Document::parse(feed)?;

    let Some(entry) = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((ATOM_NS, "entry")))
    else {
        return Ok(None);
    };

    let child_text = |name: &str| {
        entry
            .children()
            .find(|n| n.has_tag_name((ATOM_NS, name)))
            .and_then(|n| n.text())
            .map(str::trim)
    };

    let entry_id = child_text("id").unwrap_or_default();
    if entry_id.contains("/api/errors") {
        let summary = child_text("summary").unwrap_or("invalid arXiv id");
        return Err(ToolError::invalid_input(summary.to_string()));
    }

    let link = entry
        .children()
        .filter(|n| n.has_tag_name((ATOM_NS, "link")))
        .find(|n| n.attribute("title") == Some("pdf"))
        .and_then(|n| n.attribute("href"))
        .map(str::to_string);

    Ok(link.or_else(|| {
        (!entry_id.is_empty()).then(|| entry_id.replacen("/abs/", "/pdf/", 1))
    }))
}

fn artifact_file_name(paper_id: &str) -> String {
    format!("{}.pdf", paper_id.replace(['/', '\\'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feed(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
  <title type="html">ArXiv Query</title>
  <opensearch:totalResults>1</opensearch:totalResults>
  {}
</feed>"#,
            entries
        )
    }

    fn entry(id: &str, pdf: Option<&str>) -> String {
        let pdf = pdf
            .map(|href| {
                format!(
                    r#"<link title="pdf" href="{}" rel="related" type="application/pdf"/>"#,
                    href
                )
            })
            .unwrap_or_default();
        format!(
            r#"<entry>
    <id>{}</id>
    <title>A Paper</title>
    <link href="{}" rel="alternate" type="text/html"/>
    {}
  </entry>"#,
            id, id, pdf
        )
    }

    #[test]
    fn test_pdf_link_from_entry() {
        let xml = feed(&entry(
            "http://arxiv.org/abs/1706.03762v7",
            Some("http://arxiv.org/pdf/1706.03762v7"),
        ));
        assert_eq!(
            pdf_link_from_feed(&xml).unwrap().as_deref(),
            Some("http://arxiv.org/pdf/1706.03762v7")
        );
    }

    #[test]
    fn test_pdf_link_derived_from_id() {
        let xml = feed(&entry("http://arxiv.org/abs/2401.00001v1", None));
        assert_eq!(
            pdf_link_from_feed(&xml).unwrap().as_deref(),
            Some("http://arxiv.org/pdf/2401.00001v1")
        );
    }

    #[test]
    fn test_empty_feed() {
        assert!(pdf_link_from_feed(&feed("")).unwrap().is_none());
    }

    #[test]
    fn test_error_entry() {
        let xml = feed(
            r#"<entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_nonsense</id>
    <title>Error</title>
    <summary>incorrect id format for nonsense</summary>
  </entry>"#,
        );
        let err = pdf_link_from_feed(&xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "incorrect id format for nonsense");
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name("2401.00001"), "2401.00001.pdf");
        assert_eq!(artifact_file_name("hep-th/9901001"), "hep-th_9901001.pdf");
    }

    #[tokio::test]
    async fn test_download_writes_artifact() {
        let server = MockServer::start().await;
        let pdf_href = format!("{}/pdf/2401.00001v1", server.uri());

        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("id_list", "2401.00001"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&entry(
                "http://arxiv.org/abs/2401.00001v1",
                Some(&pdf_href),
            ))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pdf/2401.00001v1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 fake".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_testing(&server.uri());
        let client = ArxivClient::new(http::client(&config).unwrap(), &config);

        let artifact = client
            .download("2401.00001", &dir.path().join("papers"))
            .await
            .unwrap();

        assert_eq!(artifact.paper_id, "2401.00001");
        assert_eq!(artifact.path, dir.path().join("papers").join("2401.00001.pdf"));
        assert_eq!(artifact.bytes, 13);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"%PDF-1.5 fake");
    }

    #[tokio::test]
    async fn test_download_unknown_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed("")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_testing(&server.uri());
        let client = ArxivClient::new(http::client(&config).unwrap(), &config);

        let err = client.download("9999.99999", dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
