use std::path::PathBuf;
use std::time::Duration;

pub mod endpoints {
    pub const GITHUB_API: &str = "https://api.github.com";

    pub const GITHUB_RAW: &str = "https://raw.githubusercontent.com";

    pub const HUGGING_FACE: &str = "https://huggingface.co";

    pub const ARXIV_API: &str = "https://export.arxiv.org/api";
}

pub mod defaults {
    use std::time::Duration;

    pub const API_BASE: &str = "http://localhost:11434/v1";

    /// Ollama ignores the key but the client always sends one.
    pub const API_KEY: &str = "ollama";

    pub const MODEL: &str = "llama3.3:70b-instruct-q4_K_S";

    pub const DOWNLOAD_DIR: &str = "papers";

    pub const MAX_STEPS: usize = 20;

    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub const PDF_PAGE_LIMIT: usize = 3;

    pub const TASK: &str = "Summarize today's top paper on Hugging Face daily papers by reading it.";
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub api_base: String,
    pub api_key: String,
    pub github_api_url: String,
    pub github_raw_url: String,
    pub hugging_face_url: String,
    pub arxiv_api_url: String,
    pub download_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub max_steps: usize,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub pdf_page_limit: usize,
}

impl Config {
    #[cfg(test)]
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            github_api_url: base_url.to_string(),
            github_raw_url: format!("{}/raw", base_url),
            hugging_face_url: base_url.to_string(),
            arxiv_api_url: format!("{}/api", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: defaults::MODEL.to_string(),
            api_base: defaults::API_BASE.to_string(),
            api_key: defaults::API_KEY.to_string(),
            github_api_url: endpoints::GITHUB_API.to_string(),
            github_raw_url: endpoints::GITHUB_RAW.to_string(),
            hugging_face_url: endpoints::HUGGING_FACE.to_string(),
            arxiv_api_url: endpoints::ARXIV_API.to_string(),
            download_dir: PathBuf::from(defaults::DOWNLOAD_DIR),
            log_dir: None,
            max_steps: defaults::MAX_STEPS,
            request_timeout: defaults::REQUEST_TIMEOUT,
            connect_timeout: defaults::CONNECT_TIMEOUT,
            pdf_page_limit: defaults::PDF_PAGE_LIMIT,
        }
    }
}
