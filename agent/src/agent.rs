use crate::callbacks;
use crate::llm;
use crate::llm::Message;
use crate::tools;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub trait StopCondition {
    fn done(&self, history: &[llm::Message]) -> bool;
}

type Tool = Box<dyn tools::Tool + Send>;
type Callback = Box<dyn callbacks::Callback + Send>;

const DEFAULT_MAX_STEPS: usize = 20;

pub struct Agent {
    llm: Arc<dyn llm::LLM + Send + Sync>,
    system_prompt: Option<String>,
    tools: HashMap<String, Tool>,
    callbacks: Vec<Callback>,
    tool_defs: Vec<tools::ToolDefinition>,
    stop_condition: Box<dyn StopCondition + Send>,
    max_steps: usize,
}

impl Agent {
    async fn execute_tool_call(
        &mut self,
        tool_call: &tools::ToolCall,
        messages: Vec<llm::Message>,
    ) -> Result<Vec<llm::Message>> {
        let tool = self
            .tools
            .get_mut(&tool_call.name)
            .ok_or(Error::ToolDoesNotExist(tool_call.name.clone()))?;

        tracing::debug!(
            tool = %tool_call.name,
            id = %tool_call.id,
            args = %tool_call.args,
            "invoking tool"
        );

        let messages = tool.invoke(tool_call, messages).await?;

        Ok(messages)
    }

    pub async fn run(&mut self, mut messages: Vec<llm::Message>) -> Result<Vec<Message>> {
        let mut step = 0;

        while !self.stop_condition.done(&messages) {
            if step == self.max_steps {
                return Err(Error::StepLimitExceeded(self.max_steps));
            }
            step += 1;

            let next = self
                .llm
                .completion(llm::CompletionRequest {
                    messages: &messages,
                    tools: &self.tool_defs,
                })
                .await?;

            tracing::debug!(step, tool_calls = next.tool_calls.len(), "llm responded");

            messages.push(llm::Message::Assistant(
                next.content,
                next.tool_calls.clone(),
            ));

            for tool_call in &next.tool_calls {
                messages = self.execute_tool_call(tool_call, messages).await?;
            }

            for callback in &mut self.callbacks {
                messages = callback.call(messages).await?;
            }
        }

        tracing::info!(steps = step, "agent finished");

        Ok(messages)
    }

    /// Starts a fresh conversation from the system prompt and the given task.
    pub async fn run_task(&mut self, task: &str) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::System(prompt.clone()));
        }
        messages.push(Message::User(task.to_string()));

        self.run(messages).await
    }
}

/// Returns the answer recorded by the final answer tool, falling back to the
/// content of the last assistant message.
pub fn final_answer(history: &[Message]) -> Option<String> {
    history
        .iter()
        .rev()
        .find_map(|m| match m {
            Message::Tool { name, result, .. } if name == tools::FINAL_ANSWER => {
                Some(result.clone())
            }
            _ => None,
        })
        .or_else(|| {
            history.iter().rev().find_map(|m| match m {
                Message::Assistant(content, _) if !content.is_empty() => Some(content.clone()),
                _ => None,
            })
        })
}

pub struct AgentBuilder {
    llm: Option<Arc<dyn llm::LLM + Send + Sync>>,
    system_prompt: Option<String>,
    tools: Vec<Tool>,
    callbacks: Vec<Callback>,
    stop_condition: Option<Box<dyn StopCondition + Send>>,
    max_steps: usize,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            llm: None,
            system_prompt: None,
            tools: Vec::new(),
            callbacks: Vec::new(),
            stop_condition: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn llm(mut self, llm: Arc<dyn llm::LLM + Send + Sync>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn stop_condition(mut self, cond: Box<dyn StopCondition + Send>) -> Self {
        self.stop_condition = Some(cond);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let mut tool_defs = Vec::new();
        let mut tools = HashMap::new();

        for tool in self.tools {
            let def = tool.definition()?;
            tools.insert(def.name.clone(), tool);
            tool_defs.push(def);
        }

        Ok(Agent {
            llm: self
                .llm
                .ok_or(Error::MissingArg("llm is required for agent".to_string()))?,
            system_prompt: self.system_prompt,
            tools,
            tool_defs,
            callbacks: self.callbacks,
            stop_condition: self.stop_condition.ok_or(Error::MissingArg(
                "stop_condition is required for agent".to_string(),
            ))?,
            max_steps: self.max_steps,
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
