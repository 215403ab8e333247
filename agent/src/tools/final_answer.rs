use crate::Result;
use crate::llm::Message;
use crate::tools::{FunctionalTool, ToolCall, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

pub const FINAL_ANSWER: &str = "final_answer";

#[derive(Deserialize, JsonSchema)]
struct FinalAnswerArgs {
    /// The final answer to the task.
    answer: String,
}

/// Terminal tool: the agent calls it with its answer once the task is done.
pub struct FinalAnswer;

impl FinalAnswer {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

#[async_trait]
impl FunctionalTool for FinalAnswer {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<FinalAnswerArgs>(
            FINAL_ANSWER,
            "finish your task and provide the final answer",
        )
    }

    async fn invoke_fn(&mut self, call: &ToolCall) -> Result<Message> {
        match call.parse_args::<FinalAnswerArgs>() {
            Ok(args) => Ok(call.result(args.answer)),
            Err(rejected) => Ok(rejected),
        }
    }
}
