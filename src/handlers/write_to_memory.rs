use serde_json::Value;
use tracing::info;

use crate::context::Services;
use crate::memory::KnowledgeStore;
use crate::protocol::{McpErrorCode, McpErrorResponse, WriteToMemoryParams};
use crate::registry::RegisteredTool;
use crate::schema::SchemaValidationError;

pub const NAME: &str = "write_to_memory";

pub fn register(services: &Services) -> Result<RegisteredTool, SchemaValidationError> {
    let store = services.store.clone();
    RegisteredTool::new(
        NAME,
        "Updates the user's CSS knowledge memory for a specific concept.",
        serde_json::json!({
            "type": "object",
            "required": ["concept", "known"],
            "properties": {
                "concept": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The CSS concept name (e.g., 'Flexbox')"
                },
                "known": {
                    "type": "boolean",
                    "description": "Whether the user knows this concept (true/false)"
                }
            }
        }),
        move |args: Value| {
            let store = store.clone();
            async move {
                let params: WriteToMemoryParams = serde_json::from_value(args).map_err(|e| {
                    McpErrorResponse::new(
                        McpErrorCode::InvalidInput,
                        format!("Invalid arguments for {NAME}: {e}"),
                    )
                })?;
                handle(params, &store).await
            }
        },
    )
}

/// Handle a `write_to_memory` tool call.
///
/// The load-merge-save cycle runs under the store's write lock, so
/// concurrent calls for different concepts never drop each other's update.
pub async fn handle(
    params: WriteToMemoryParams,
    store: &KnowledgeStore,
) -> Result<String, McpErrorResponse> {
    store.record_concept(&params.concept, params.known).await?;
    info!(concept = %params.concept, known = params.known, "Memory updated");

    Ok(format!(
        "Memory updated successfully for concept: {}",
        params.concept
    ))
}
