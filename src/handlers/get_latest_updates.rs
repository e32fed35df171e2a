use tracing::info;

use crate::context::Services;
use crate::protocol::{McpErrorCode, McpErrorResponse};
use crate::registry::RegisteredTool;
use crate::schema::SchemaValidationError;
use crate::upstream::UpdateFetcher;

pub const NAME: &str = "get_latest_updates";

pub fn register(services: &Services) -> Result<RegisteredTool, SchemaValidationError> {
    let fetcher = services.fetcher.clone();
    RegisteredTool::new(
        NAME,
        "Fetches recent news and updates about CSS features using Perplexity Sonar via OpenRouter.",
        serde_json::json!({
            "type": "object",
            "properties": {}
        }),
        move |_args| {
            let fetcher = fetcher.clone();
            async move { handle(fetcher.as_deref()).await }
        },
    )
}

/// Handle a `get_latest_updates` tool call.
///
/// Registration is skipped without an API key, so `None` only shows up when
/// the tool is wired by hand.
pub async fn handle(fetcher: Option<&UpdateFetcher>) -> Result<String, McpErrorResponse> {
    let fetcher = fetcher.ok_or_else(|| {
        McpErrorResponse::new(
            McpErrorCode::NotConfigured,
            format!("{NAME} requires OPENROUTER_API_KEY"),
        )
    })?;

    let summary = fetcher.fetch_latest().await?;
    info!(bytes = summary.len(), "Fetched CSS updates");
    Ok(summary)
}

