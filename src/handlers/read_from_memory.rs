use tracing::error;

use crate::context::Services;
use crate::memory::KnowledgeStore;
use crate::protocol::{McpErrorCode, McpErrorResponse};
use crate::registry::RegisteredTool;
use crate::schema::SchemaValidationError;

pub const NAME: &str = "read_from_memory";

pub fn register(services: &Services) -> Result<RegisteredTool, SchemaValidationError> {
    let store = services.store.clone();
    RegisteredTool::new(
        NAME,
        "Reads the user's current CSS knowledge from memory.",
        serde_json::json!({
            "type": "object",
            "properties": {}
        }),
        move |_args| {
            let store = store.clone();
            async move { handle(&store).await }
        },
    )
}

/// Handle a `read_from_memory` tool call.
///
/// Returns the whole knowledge record as pretty-printed JSON.
pub async fn handle(store: &KnowledgeStore) -> Result<String, McpErrorResponse> {
    let record = store.load().await?;

    serde_json::to_string_pretty(&record).map_err(|e| {
        error!("Serialization failed: {e}");
        McpErrorResponse::canonical(McpErrorCode::InternalError)
    })
}
