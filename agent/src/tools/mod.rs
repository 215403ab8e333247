use crate::Result;
use crate::llm::Message;
use async_trait::async_trait;
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;

mod final_answer;
pub use final_answer::{FINAL_ANSWER, FinalAnswer};

/// Tool name recorded on the result of a call whose arguments did not decode.
pub const INVALID_ARGUMENTS: &str = "invalid_arguments";

pub struct ToolDefinition {
    pub name: String,
    pub desc: String,
    pub params: serde_json::Value,
}

impl ToolDefinition {
    pub fn new<P: JsonSchema>(name: &str, desc: &str) -> Result<Self> {
        let schema = schema_for!(P);
        let params = serde_json::to_value(&schema.schema)?;
        Ok(Self {
            name: name.to_string(),
            desc: desc.to_string(),
            params,
        })
    }
}

/// Argument type for tools that take no parameters. Serializes to an empty
/// object schema, which chat-completion APIs require for function parameters.
#[derive(serde::Deserialize, JsonSchema)]
pub struct NoArgs {}

#[derive(Clone, Debug, Hash)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: String,
}

impl ToolCall {
    pub fn args<O: for<'de> serde::Deserialize<'de>>(&self) -> Result<O> {
        let args = serde_json::from_str(&self.args)?;
        Ok(args)
    }

    /// Like `args`, but a decode failure comes back as a result message the
    /// model can react to instead of an error that ends the run.
    pub fn parse_args<A: DeserializeOwned>(&self) -> std::result::Result<A, Message> {
        self.args().map_err(|err| {
            tracing::warn!(tool = %self.name, %err, "malformed tool arguments");
            Message::Tool {
                id: self.id.clone(),
                name: INVALID_ARGUMENTS.to_string(),
                result: format!("invalid arguments for {}: {}", self.name, err),
            }
        })
    }

    pub fn result(&self, result: impl Into<String>) -> Message {
        Message::Tool {
            id: self.id.clone(),
            name: self.name.clone(),
            result: result.into(),
        }
    }
}

impl std::fmt::Display for ToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "- {} ({})\n\t- `{}`\n\n", self.name, self.id, self.args)
    }
}

#[async_trait]
pub trait Tool {
    fn definition(&self) -> Result<ToolDefinition>;

    async fn invoke(&mut self, args: &ToolCall, messages: Vec<Message>) -> Result<Vec<Message>>;
}

/// A tool that only appends its own result message to the history.
#[async_trait]
pub trait FunctionalTool {
    fn definition(&self) -> Result<ToolDefinition>;

    async fn invoke_fn(&mut self, args: &ToolCall) -> Result<Message>;
}

#[async_trait]
impl<T> Tool for T
where
    T: FunctionalTool + Send + Sync,
{
    fn definition(&self) -> Result<ToolDefinition> {
        FunctionalTool::definition(self)
    }

    async fn invoke(
        &mut self,
        args: &ToolCall,
        mut messages: Vec<Message>,
    ) -> Result<Vec<Message>> {
        let result = FunctionalTool::invoke_fn(self, args).await?;
        messages.push(result);
        Ok(messages)
    }
}
