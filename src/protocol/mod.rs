pub mod request;
pub mod response;

pub use request::{
    ClientInfo, InitializeParams, JsonRpcRequest, PromptGetParams, ResourceReadParams, RpcId,
    ToolCallParams, WriteToMemoryParams,
};
pub use response::{
    JsonRpcError, JsonRpcResponse, McpError, McpErrorCode, McpErrorResponse, PromptDefinition,
    PromptGetResult, PromptMessage, ResourceAccess, ResourceContents, ResourceDefinition,
    ResourceReadResult, ToolDefinition, ToolResult, ToolResultContent,
};
