use reqwest::{Client, RequestBuilder, Response};

use crate::config::Config;
use crate::error::{ToolError, ToolResult};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by all upstream clients. GitHub rejects
/// requests without a user agent.
pub fn client(config: &Config) -> ToolResult<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .build()?;
    Ok(client)
}

pub async fn send(request: RequestBuilder) -> ToolResult<Response> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%url, status = status.as_u16(), "upstream request failed");
        return Err(ToolError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}
