pub mod get_latest_updates;
pub mod read_from_memory;
pub mod write_to_memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::ServerContext;
use crate::prompts;
use crate::protocol::{
    InitializeParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, PromptGetParams,
    ResourceReadParams, ResourceReadResult, ToolCallParams,
};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Dispatch a JSON-RPC request to the appropriate handler.
///
/// Returns `None` for notifications (no response required).
pub async fn dispatch(req: &JsonRpcRequest, ctx: &ServerContext) -> Option<JsonRpcResponse> {
    let result = match req.method.as_str() {
        "initialize" => Ok(initialize(req)),

        method if method.starts_with("notifications/") => {
            debug!(method, "Notification received");
            return None;
        }

        "ping" => Ok(serde_json::json!({})),

        "tools/list" => Ok(serde_json::json!({ "tools": ctx.tools.definitions() })),

        "tools/call" => call_tool(req, ctx).await,

        "resources/list" => Ok(serde_json::json!({ "resources": [ctx.memory.definition()] })),

        "resources/read" => read_resource(req, ctx).await,

        "prompts/list" => Ok(serde_json::json!({ "prompts": prompts::definitions() })),

        "prompts/get" => get_prompt(req),

        _ => Err(JsonRpcError::method_not_found(&req.method)),
    };

    Some(match result {
        Ok(value) => JsonRpcResponse::success(req.id.clone(), value),
        Err(err) => JsonRpcResponse::error(req.id.clone(), err),
    })
}

fn initialize(req: &JsonRpcRequest) -> serde_json::Value {
    let params = req
        .params
        .as_ref()
        .and_then(|v| serde_json::from_value::<InitializeParams>(v.clone()).ok());

    if let Some(params) = params {
        let client = params.client_info.as_ref();
        info!(
            client = client.and_then(|c| c.name.as_deref()).unwrap_or("unknown"),
            client_version = client.and_then(|c| c.version.as_deref()).unwrap_or("unknown"),
            protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
            "Client initializing"
        );
    }

    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "resources": {},
            "prompts": {}
        },
        "serverInfo": {
            "name": "css-tutor-mcp-server",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn call_tool(
    req: &JsonRpcRequest,
    ctx: &ServerContext,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: ToolCallParams = parse_params(req)?;

    match ctx.tools.call(&params.name, params.arguments).await {
        Some(tool_result) => to_value(&tool_result),
        None => {
            warn!(tool = %params.name, "Call to unregistered tool");
            Err(JsonRpcError::invalid_params(format!(
                "Unknown tool: {}",
                params.name
            )))
        }
    }
}

async fn read_resource(
    req: &JsonRpcRequest,
    ctx: &ServerContext,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: ResourceReadParams = parse_params(req)?;

    if !ctx.memory.matches(&params.uri) {
        return Err(JsonRpcError::resource_not_found(&params.uri));
    }

    let contents = ctx.memory.read(&params.uri).await?;
    to_value(&ResourceReadResult {
        contents: vec![contents],
    })
}

fn get_prompt(req: &JsonRpcRequest) -> Result<serde_json::Value, JsonRpcError> {
    let params: PromptGetParams = parse_params(req)?;

    match prompts::get(&params.name) {
        Some(prompt) => to_value(&prompt),
        None => Err(JsonRpcError::invalid_params(format!(
            "Unknown prompt: {}",
            params.name
        ))),
    }
}

fn parse_params<T: DeserializeOwned>(req: &JsonRpcRequest) -> Result<T, JsonRpcError> {
    match &req.params {
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            JsonRpcError::invalid_params(format!("Invalid {} params: {e}", req.method))
        }),
        None => Err(JsonRpcError::invalid_params(format!(
            "Missing params for {}",
            req.method
        ))),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
