use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Config, defaults};

#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Reads today's top paper and inspects GitHub repositories with a local LLM"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory downloaded papers are saved to
    #[arg(long, env = "SCOUT_DOWNLOAD_DIR", default_value = defaults::DOWNLOAD_DIR, global = true)]
    pub download_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hand a task to the manager agent and print its answer
    Run(RunArgs),

    /// Invoke a single tool directly, without a model
    #[command(subcommand)]
    Tool(ToolCommand),
}

#[derive(Args)]
pub struct RunArgs {
    /// Task for the agent
    #[arg(default_value = defaults::TASK)]
    pub task: String,

    /// Model name on the chat-completions server
    #[arg(long, env = "SCOUT_MODEL", default_value = defaults::MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "SCOUT_API_BASE", default_value = defaults::API_BASE)]
    pub api_base: String,

    #[arg(long, env = "SCOUT_API_KEY", default_value = defaults::API_KEY, hide_env_values = true)]
    pub api_key: String,

    /// Steps each agent may take before giving up
    #[arg(long, env = "SCOUT_MAX_STEPS", default_value_t = defaults::MAX_STEPS)]
    pub max_steps: usize,

    /// Write markdown transcripts of every agent to this directory
    #[arg(long, env = "SCOUT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ToolCommand {
    /// Repository metadata as JSON
    RepoInfo { github_url: String },

    /// Recursive file tree of the default branch
    RepoStructure { github_url: String },

    /// Raw content of one file on the default branch
    FileContent { github_url: String, file_path: String },

    /// Title of the top Hugging Face daily paper
    DailyPaper,

    /// arXiv id for a paper title
    PaperId { title: String },

    /// Download a paper's PDF from arXiv
    Download { paper_id: String },

    /// Text of the first pages of a PDF
    ReadPdf { file_path: PathBuf },
}

impl Cli {
    pub fn config(&self) -> Config {
        let mut config = Config {
            download_dir: self.download_dir.clone(),
            ..Config::default()
        };

        if let Commands::Run(run) = &self.command {
            config.model = run.model.clone();
            config.api_base = run.api_base.clone();
            config.api_key = run.api_key.clone();
            config.max_steps = run.max_steps;
            config.log_dir = run.log_dir.clone();
        }

        config
    }
}
