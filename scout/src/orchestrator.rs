use agent::callbacks::MessageLogger;
use agent::llm::{self, Message};
use agent::tools::{self, FINAL_ANSWER, FinalAnswer};
use agent::{Agent, AgentBuilder, Error, Result, StopCondition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::tools::ToolContext;

const MANAGER_PROMPT: &str = include_str!("prompts/manager.md");
const PAPER_AGENT_PROMPT: &str = include_str!("prompts/paper_agent.md");
const REPO_AGENT_PROMPT: &str = include_str!("prompts/repo_agent.md");

type Llm = Arc<dyn llm::LLM + Send + Sync>;

/// Done once the final answer tool ran, or the model answered in plain text
/// without asking for any tool.
pub struct FinalAnswerGiven;

impl StopCondition for FinalAnswerGiven {
    fn done(&self, history: &[Message]) -> bool {
        match history.last() {
            Some(Message::Tool { name, .. }) => name == FINAL_ANSWER,
            Some(Message::Assistant(content, tool_calls)) => {
                tool_calls.is_empty() && !content.trim().is_empty()
            }
            _ => false,
        }
    }
}

pub struct Orchestrator {
    agent: Agent,
}

impl Orchestrator {
    pub fn new(llm: Llm, ctx: ToolContext, config: &Config) -> Result<Self> {
        let mut builder = AgentBuilder::new()
            .system_prompt(MANAGER_PROMPT.to_string())
            .llm(llm.clone())
            .tool(Box::new(ManagedAgent {
                kind: ManagedKind::Papers,
                ctx: ctx.clone(),
                llm: llm.clone(),
                max_steps: config.max_steps,
                log_dir: config.log_dir.clone(),
            }))
            .tool(Box::new(ManagedAgent {
                kind: ManagedKind::Repository,
                ctx,
                llm,
                max_steps: config.max_steps,
                log_dir: config.log_dir.clone(),
            }))
            .tool(FinalAnswer::new())
            .stop_condition(Box::new(FinalAnswerGiven))
            .max_steps(config.max_steps);

        if let Some(dir) = &config.log_dir {
            builder = builder.callback(transcript("manager", dir)?);
        }

        Ok(Self {
            agent: builder.build()?,
        })
    }

    pub async fn run(mut self, task: &str) -> Result<String> {
        let history = self.agent.run_task(task).await?;
        agent::final_answer(&history).ok_or(Error::AgentWorkflowError(
            "manager finished without an answer".to_string(),
        ))
    }
}

fn transcript(name: &str, dir: &Path) -> Result<Box<MessageLogger<BufWriter<File>>>> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("{}.md", name)))?;
    MessageLogger::new(name, BufWriter::new(file))
}

#[derive(Clone, Copy)]
enum ManagedKind {
    Papers,
    Repository,
}

impl ManagedKind {
    fn name(self) -> &'static str {
        match self {
            ManagedKind::Papers => "paper_agent",
            ManagedKind::Repository => "repo_agent",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ManagedKind::Papers => {
                "delegate a task to an agent that can find today's top Hugging Face paper, look up arXiv ids by title, download papers and read them"
            }
            ManagedKind::Repository => {
                "delegate a task to an agent that can inspect GitHub repositories: metadata, file tree and file contents"
            }
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            ManagedKind::Papers => PAPER_AGENT_PROMPT,
            ManagedKind::Repository => REPO_AGENT_PROMPT,
        }
    }

    fn tools(self, ctx: &ToolContext) -> Vec<Box<dyn tools::Tool + Send>> {
        match self {
            ManagedKind::Papers => ctx.paper_tools(),
            ManagedKind::Repository => ctx.repository_tools(),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
struct DelegateArgs {
    /// A complete description of the task for the agent.
    task: String,
}

struct ManagedAgent {
    kind: ManagedKind,
    ctx: ToolContext,
    llm: Llm,
    max_steps: usize,
    log_dir: Option<PathBuf>,
}

impl ManagedAgent {
    fn build(&self) -> Result<Agent> {
        let mut builder = AgentBuilder::new()
            .system_prompt(self.kind.prompt().to_string())
            .llm(self.llm.clone())
            .tools(self.kind.tools(&self.ctx))
            .tool(FinalAnswer::new())
            .stop_condition(Box::new(FinalAnswerGiven))
            .max_steps(self.max_steps);

        if let Some(dir) = &self.log_dir {
            builder = builder.callback(transcript(self.kind.name(), dir)?);
        }

        builder.build()
    }
}

#[async_trait]
impl tools::FunctionalTool for ManagedAgent {
    fn definition(&self) -> Result<tools::ToolDefinition> {
        tools::ToolDefinition::new::<DelegateArgs>(self.kind.name(), self.kind.description())
    }

    async fn invoke_fn(&mut self, call: &tools::ToolCall) -> Result<Message> {
        let args: DelegateArgs = match call.parse_args() {
            Ok(args) => args,
            Err(message) => return Ok(message),
        };
        tracing::info!(agent = self.kind.name(), task = %args.task, "delegating task");

        let mut sub_agent = self.build()?;
        let run = tokio::spawn(async move { sub_agent.run_task(&args.task).await });
        let history = match run.await? {
            Ok(history) => history,
            Err(Error::StepLimitExceeded(steps)) => {
                tracing::warn!(agent = self.kind.name(), steps, "managed agent ran out of steps");
                return Ok(call.result(format!(
                    "{} gave up after {} steps without an answer",
                    self.kind.name(),
                    steps
                )));
            }
            Err(err) => return Err(err),
        };

        let answer = agent::final_answer(&history).unwrap_or_default();
        Ok(call.result(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::llm::{CompletionRequest, CompletionResponse, LLM};
    use agent::tools::{INVALID_ARGUMENTS, ToolCall};
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct ScriptedLLM {
        script: Mutex<Vec<CompletionResponse>>,
        offered: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedLLM {
        fn new(mut script: Vec<CompletionResponse>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self {
                script: Mutex::new(script),
                offered: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLM for ScriptedLLM {
        async fn completion<'a>(
            &self,
            request: CompletionRequest<'a>,
        ) -> Result<CompletionResponse> {
            self.offered
                .lock()
                .unwrap()
                .push(request.tools.iter().map(|t| t.name.clone()).collect());
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or(Error::LLMResponseError("script exhausted".to_string()))
        }
    }

    fn tool_call(name: &str, args: serde_json::Value) -> CompletionResponse {
        CompletionResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: format!("call_{}", name),
                name: name.to_string(),
                args: args.to_string(),
            }],
        }
    }

    #[test]
    fn test_stop_condition() {
        let stop = FinalAnswerGiven;
        assert!(!stop.done(&[Message::User("task".to_string())]));
        assert!(!stop.done(&[Message::Assistant(
            String::new(),
            vec![ToolCall {
                id: "1".to_string(),
                name: "get_repo_info".to_string(),
                args: "{}".to_string(),
            }]
        )]));
        assert!(!stop.done(&[Message::Tool {
            id: "1".to_string(),
            name: "get_repo_info".to_string(),
            result: "{}".to_string(),
        }]));
        assert!(!stop.done(&[Message::Tool {
            id: "1".to_string(),
            name: INVALID_ARGUMENTS.to_string(),
            result: "invalid arguments for final_answer: missing field `answer`".to_string(),
        }]));
        assert!(stop.done(&[Message::Tool {
            id: "1".to_string(),
            name: FINAL_ANSWER.to_string(),
            result: "done".to_string(),
        }]));
        assert!(stop.done(&[Message::Assistant("plain answer".to_string(), vec![])]));
    }

    #[tokio::test]
    async fn test_manager_delegates_to_paper_agent() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/papers"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<div class=\"SVELTE_HYDRATER contents\" data-props=\"{}\"></div>",
                json!({"dailyPapers": [{"title": "Tiny Agents"}]})
                    .to_string()
                    .replace('"', "&quot;")
            )))
            .expect(1)
            .mount(&server)
            .await;

        let llm = ScriptedLLM::new(vec![
            // manager
            tool_call("paper_agent", json!({"task": "find today's top paper"})),
            // paper agent
            tool_call("get_hugging_face_top_daily_paper", json!({})),
            tool_call("final_answer", json!({"answer": "Top paper: Tiny Agents"})),
            // manager again
            tool_call("final_answer", json!({"answer": "Today's top paper is Tiny Agents"})),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_testing(&server.uri());
        config.download_dir = dir.path().join("papers");
        config.log_dir = Some(dir.path().join("logs"));
        let ctx = ToolContext::new(&config).unwrap();

        let answer = Orchestrator::new(llm.clone(), ctx, &config)?
            .run("Summarize today's top paper")
            .await?;
        assert_eq!(answer, "Today's top paper is Tiny Agents");

        let offered = llm.offered.lock().unwrap().clone();
        assert_eq!(offered.len(), 4);
        assert_eq!(offered[0], ["paper_agent", "repo_agent", "final_answer"]);
        assert!(offered[1].contains(&"read_pdf_file".to_string()));
        assert!(!offered[1].contains(&"get_repo_info".to_string()));

        let manager_log = std::fs::read_to_string(dir.path().join("logs/manager.md"))?;
        assert!(manager_log.contains("Top paper: Tiny Agents"));
        assert!(dir.path().join("logs/paper_agent.md").exists());

        Ok(())
    }

    #[tokio::test]
    async fn test_managed_agent_step_limit_is_reported() -> Result<()> {
        let server = MockServer::start().await;
        let llm = ScriptedLLM::new(vec![
            tool_call("repo_agent", json!({"task": "inspect a repo"})),
            tool_call("get_repo_info", json!({"github_url": "not a url"})),
            tool_call("get_repo_info", json!({"github_url": "still not a url"})),
            tool_call("final_answer", json!({"answer": "could not inspect"})),
        ]);

        let mut config = Config::for_testing(&server.uri());
        config.max_steps = 2;
        let ctx = ToolContext::new(&config).unwrap();

        let mut agent = Orchestrator::new(llm, ctx, &config)?.agent;
        let history = agent.run_task("inspect").await?;

        assert!(history.iter().any(|m| matches!(
            m,
            Message::Tool { name, result, .. }
                if name == "repo_agent"
                    && result == "repo_agent gave up after 2 steps without an answer"
        )));
        assert_eq!(agent::final_answer(&history).as_deref(), Some("could not inspect"));

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_final_answer_recovers() -> Result<()> {
        let server = MockServer::start().await;
        let llm = ScriptedLLM::new(vec![
            // manager
            tool_call("repo_agent", json!({"task": "describe octo/widgets"})),
            // repo agent
            tool_call("final_answer", json!({"result": "widgets"})),
            tool_call("final_answer", json!({"answer": "widgets is a demo repo"})),
            // manager again
            tool_call("final_answer", json!({"summary": "oops"})),
            tool_call("final_answer", json!({"answer": "It is a demo repo"})),
        ]);

        let config = Config::for_testing(&server.uri());
        let ctx = ToolContext::new(&config).unwrap();

        let mut manager = Orchestrator::new(llm.clone(), ctx, &config)?.agent;
        let history = manager.run_task("describe the repo").await?;

        assert!(history.iter().any(|m| matches!(
            m,
            Message::Tool { name, result, .. }
                if name == "repo_agent" && result == "widgets is a demo repo"
        )));
        assert!(history.iter().any(|m| matches!(
            m,
            Message::Tool { name, result, .. }
                if name == INVALID_ARGUMENTS
                    && result.starts_with("invalid arguments for final_answer")
        )));
        assert_eq!(agent::final_answer(&history).as_deref(), Some("It is a demo repo"));
        assert_eq!(llm.offered.lock().unwrap().len(), 5);

        Ok(())
    }
}
