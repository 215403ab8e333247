mod cli;
mod config;
mod error;
mod github;
mod http;
mod orchestrator;
mod papers;
mod tools;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, ToolCommand};
use crate::tools::ToolContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("scout={},agent={}", log_level, log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = cli.config();
    let ctx = ToolContext::new(&config).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Run(run) => {
            let llm = agent::llm::OpenAI::compatible(
                config.model.clone(),
                &config.api_base,
                &config.api_key,
            );
            tracing::info!(
                model = llm.model(),
                api_base = %config.api_base,
                "starting manager agent"
            );

            let orchestrator = orchestrator::Orchestrator::new(llm, ctx, &config)?;
            let answer = orchestrator.run(&run.task).await?;
            println!("{}", answer);
        }
        Commands::Tool(command) => {
            let result = match command {
                ToolCommand::RepoInfo { github_url } => ctx.repo_info(&github_url).await,
                ToolCommand::RepoStructure { github_url } => ctx.repo_structure(&github_url).await,
                ToolCommand::FileContent {
                    github_url,
                    file_path,
                } => ctx.file_content(&github_url, &file_path).await,
                ToolCommand::DailyPaper => ctx.top_daily_paper().await,
                ToolCommand::PaperId { title } => ctx.paper_id_by_title(&title).await,
                ToolCommand::Download { paper_id } => ctx.download_paper(&paper_id).await,
                ToolCommand::ReadPdf { file_path } => {
                    ctx.read_pdf(&file_path.to_string_lossy()).await
                }
            };

            match result {
                Ok(output) => println!("{}", output),
                Err(err) => {
                    eprintln!("{}", err);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
