use std::sync::Arc;

use tracing::warn;

use super::store::KnowledgeStore;
use crate::protocol::{
    McpErrorCode, McpErrorResponse, ResourceAccess, ResourceContents, ResourceDefinition,
};

pub const RESOURCE_NAME: &str = "css_knowledge_memory";
pub const RESOURCE_URI: &str = "memory://css_knowledge_memory/";
pub const RESOURCE_MIME_TYPE: &str = "application/json";

/// Read-only view of the knowledge record, addressed by URI.
///
/// Advertises write access because the record is mutable, but mutation only
/// ever happens through the `write_to_memory` tool.
#[derive(Debug, Clone)]
pub struct MemoryResource {
    store: Arc<KnowledgeStore>,
}

impl MemoryResource {
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self { store }
    }

    pub fn definition(&self) -> ResourceDefinition {
        ResourceDefinition {
            uri: RESOURCE_URI.into(),
            name: RESOURCE_NAME.into(),
            description: "The user's CSS knowledge profile: concept name to known flag".into(),
            mime_type: RESOURCE_MIME_TYPE.into(),
            access: ResourceAccess {
                read: true,
                write: true,
            },
        }
    }

    /// True for the base URI itself and anything beneath it.
    pub fn matches(&self, uri: &str) -> bool {
        uri.starts_with(RESOURCE_URI) || uri == RESOURCE_URI.trim_end_matches('/')
    }

    /// Return the whole record; any path below the base is ignored.
    pub async fn read(&self, uri: &str) -> Result<ResourceContents, McpErrorResponse> {
        let record = self.store.load().await.map_err(|e| {
            warn!(uri, "Resource read failed: {e}");
            McpErrorResponse::from(e)
        })?;

        let text = serde_json::to_string(&record).map_err(|e| {
            warn!(uri, "Serialization failed: {e}");
            McpErrorResponse::canonical(McpErrorCode::InternalError)
        })?;

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: RESOURCE_MIME_TYPE.into(),
            text,
        })
    }
}
