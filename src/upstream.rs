//! Client for the chat-completion API that summarizes recent CSS news.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::protocol::{McpErrorCode, McpErrorResponse};

const SYSTEM_INSTRUCTION: &str = "You are an AI assistant specialized in finding the latest CSS news and updates. Summarize the key recent developments concisely.";

const USER_QUERY: &str = "What are the most important recent updates or newly released features in CSS? Focus on things developers should be aware of in the last few months.";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Upstream response is not valid JSON: {0}")]
    MalformedBody(String),
    #[error("Upstream response has no message content")]
    MissingContent,
}

impl From<UpstreamError> for McpErrorResponse {
    fn from(err: UpstreamError) -> Self {
        McpErrorResponse::new(McpErrorCode::UpstreamError, err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Fetches a prose summary of recent CSS developments.
///
/// One request per call; no timeout beyond the HTTP client's default and no
/// retries.
#[derive(Clone)]
pub struct UpdateFetcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for UpdateFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateFetcher")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl UpdateFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("css-tutor-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_latest(&self) -> Result<String, UpstreamError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: USER_QUERY,
                },
            ],
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Requesting CSS updates");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Upstream rejected request");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        extract_content(&text)
    }
}

/// Pull `choices[0].message.content` out of a chat-completion body.
fn extract_content(body: &str) -> Result<String, UpstreamError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(UpstreamError::MissingContent)
}
