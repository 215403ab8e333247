use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent::Result;
use agent::llm::Message;
use agent::tools::{FunctionalTool, NoArgs, Tool, ToolCall, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::config::Config;
use crate::error::ToolResult;
use crate::github::GitHubClient;
use crate::http;
use crate::papers::{self, ArxivClient, HuggingFaceClient};

#[derive(Clone)]
pub struct ToolContext {
    github: Arc<GitHubClient>,
    hugging_face: Arc<HuggingFaceClient>,
    arxiv: Arc<ArxivClient>,
    download_dir: PathBuf,
    pdf_page_limit: usize,
}

impl ToolContext {
    pub fn new(config: &Config) -> ToolResult<Self> {
        let http = http::client(config)?;
        Ok(Self {
            github: Arc::new(GitHubClient::new(http.clone(), config)),
            hugging_face: Arc::new(HuggingFaceClient::new(http.clone(), config)),
            arxiv: Arc::new(ArxivClient::new(http, config)),
            download_dir: config.download_dir.clone(),
            pdf_page_limit: config.pdf_page_limit,
        })
    }

    pub async fn repo_info(&self, github_url: &str) -> ToolResult<String> {
        let info = self.github.repo_info(github_url).await?;
        Ok(serde_json::to_string_pretty(&info)?)
    }

    pub async fn repo_structure(&self, github_url: &str) -> ToolResult<String> {
        let tree = self.github.repo_structure(github_url).await?;
        Ok(serde_json::to_string(&tree)?)
    }

    pub async fn file_content(&self, github_url: &str, file_path: &str) -> ToolResult<String> {
        self.github.file_content(github_url, file_path).await
    }

    pub async fn top_daily_paper(&self) -> ToolResult<String> {
        Ok(self
            .hugging_face
            .top_daily_paper()
            .await?
            .unwrap_or_else(|| "No daily papers found on the Hugging Face papers page".to_string()))
    }

    pub async fn paper_id_by_title(&self, title: &str) -> ToolResult<String> {
        self.hugging_face.paper_id_by_title(title).await
    }

    pub async fn download_paper(&self, paper_id: &str) -> ToolResult<String> {
        let artifact = self.arxiv.download(paper_id, &self.download_dir).await?;
        Ok(format!(
            "saved paper {} ({} bytes) to {}",
            artifact.paper_id,
            artifact.bytes,
            artifact.path.display()
        ))
    }

    pub async fn read_pdf(&self, file_path: &str) -> ToolResult<String> {
        papers::read_pdf(Path::new(file_path), self.pdf_page_limit).await
    }

    pub fn repository_tools(&self) -> Vec<Box<dyn Tool + Send>> {
        vec![
            Box::new(GetRepoInfo(self.clone())),
            Box::new(GetRepoStructure(self.clone())),
            Box::new(GetFileContent(self.clone())),
        ]
    }

    pub fn paper_tools(&self) -> Vec<Box<dyn Tool + Send>> {
        vec![
            Box::new(GetTopDailyPaper(self.clone())),
            Box::new(GetPaperIdByTitle(self.clone())),
            Box::new(DownloadPaperById(self.clone())),
            Box::new(ReadPdfFile(self.clone())),
        ]
    }
}

fn render(call: &ToolCall, result: ToolResult<String>) -> Message {
    match result {
        Ok(result) => call.result(result),
        Err(err) => {
            tracing::warn!(tool = %call.name, kind = ?err.kind(), %err, "tool failed");
            call.result(err.to_string())
        }
    }
}

#[derive(Deserialize, JsonSchema)]
struct RepoArgs {
    /// The GitHub repository URL.
    github_url: String,
}

#[derive(Deserialize, JsonSchema)]
struct FileArgs {
    /// The GitHub repository URL.
    github_url: String,
    /// Path to the file within the repository.
    file_path: String,
}

#[derive(Deserialize, JsonSchema)]
struct TitleArgs {
    /// The paper title for which to get the id.
    title: String,
}

#[derive(Deserialize, JsonSchema)]
struct PaperIdArgs {
    /// The arXiv id of the paper to download.
    paper_id: String,
}

#[derive(Deserialize, JsonSchema)]
struct PdfArgs {
    /// The path to the PDF file.
    file_path: String,
}

struct GetRepoInfo(ToolContext);

#[async_trait]
impl FunctionalTool for GetRepoInfo {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<RepoArgs>(
            "get_repo_info",
            "Get repository information such as description, size, stars and language from the GitHub API. Returns the repository document as JSON.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: RepoArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        Ok(render(call, self.0.repo_info(&args.github_url).await))
    }
}

struct GetRepoStructure(ToolContext);

#[async_trait]
impl FunctionalTool for GetRepoStructure {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<RepoArgs>(
            "get_repo_structure",
            "Get the full file tree of a GitHub repository's default branch as a flat JSON list of path/type entries.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: RepoArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        Ok(render(call, self.0.repo_structure(&args.github_url).await))
    }
}

struct GetFileContent(ToolContext);

#[async_trait]
impl FunctionalTool for GetFileContent {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<FileArgs>(
            "get_file_content",
            "Get the content of a specific file from a GitHub repository's default branch.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: FileArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        Ok(render(
            call,
            self.0.file_content(&args.github_url, &args.file_path).await,
        ))
    }
}

struct GetTopDailyPaper(ToolContext);

#[async_trait]
impl FunctionalTool for GetTopDailyPaper {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<NoArgs>(
            "get_hugging_face_top_daily_paper",
            "Returns the title of the most upvoted paper on Hugging Face daily papers.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        Ok(render(call, self.0.top_daily_paper().await))
    }
}

struct GetPaperIdByTitle(ToolContext);

#[async_trait]
impl FunctionalTool for GetPaperIdByTitle {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<TitleArgs>(
            "get_paper_id_by_title",
            "Returns the arXiv id of a paper given its title.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: TitleArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        Ok(render(call, self.0.paper_id_by_title(&args.title).await))
    }
}

struct DownloadPaperById(ToolContext);

#[async_trait]
impl FunctionalTool for DownloadPaperById {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<PaperIdArgs>(
            "download_paper_by_id",
            "Downloads a paper's PDF from arXiv given its id. Returns the path the PDF was saved to; pass that path to read_pdf_file.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: PaperIdArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        Ok(render(call, self.0.download_paper(&args.paper_id).await))
    }
}

struct ReadPdfFile(ToolContext);

#[async_trait]
impl FunctionalTool for ReadPdfFile {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<PdfArgs>(
            "read_pdf_file",
            "Reads the first three pages of a PDF file and returns their text.",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        let args: PdfArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        Ok(render(call, self.0.read_pdf(&args.file_path).await))
    }
}
