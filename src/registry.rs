//! Named tools with declared input shapes and a uniform call contract.
//!
//! A call validates the raw arguments against the tool's input schema, runs
//! the handler as its own task, and always comes back as a [`ToolResult`]:
//! schema violations, handler errors and handler panics all become
//! `isError: true` results instead of unwinding into the server loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::protocol::{McpErrorCode, McpErrorResponse, ToolDefinition, ToolResult};
use crate::schema::{SchemaValidationError, SchemaValidator};

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<String, McpErrorResponse>> + Send>>;

type Handler = Arc<dyn Fn(Value) -> ToolFuture + Send + Sync>;

/// Gate deciding at startup whether a registration applies.
pub type Predicate<D> = fn(&D) -> bool;

/// Builds one tool from the startup dependencies.
pub type Registration<D> = fn(&D) -> Result<RegisteredTool, SchemaValidationError>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid tool input schema: {0}")]
    Schema(#[from] SchemaValidationError),
    #[error("Tool registered twice: {0}")]
    DuplicateTool(String),
}

pub struct RegisteredTool {
    name: String,
    description: String,
    input: SchemaValidator,
    handler: Handler,
}

impl RegisteredTool {
    pub fn new<F, Fut>(
        name: &str,
        description: &str,
        input_schema: Value,
        handler: F,
    ) -> Result<Self, SchemaValidationError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, McpErrorResponse>> + Send + 'static,
    {
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            input: SchemaValidator::compile(input_schema)?,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input.schema().clone(),
        }
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// The tool set, fixed once at startup. Listing preserves registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every registration whose predicate holds for `deps`.
    pub fn build<D>(
        deps: &D,
        table: &[(Predicate<D>, Registration<D>)],
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (enabled, register) in table {
            if enabled(deps) {
                registry.register(register(deps)?)?;
            }
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: RegisteredTool) -> Result<(), RegistryError> {
        if self.contains(tool.name()) {
            return Err(RegistryError::DuplicateTool(tool.name));
        }
        debug!(tool = %tool.name, "Registered tool");
        self.tools.push(tool);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(RegisteredTool::definition).collect()
    }

    /// Invoke a tool by name.
    ///
    /// Returns `None` if no tool of that name is registered; the caller
    /// reports that at the protocol level.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Option<ToolResult> {
        let tool = self.get(name)?;
        let args = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        if let Err(e) = tool.input.check(&args) {
            let detail = match e {
                SchemaValidationError::ValidationFailed(violations) => violations.join("; "),
                other => other.to_string(),
            };
            warn!(tool = name, "Rejected arguments: {detail}");
            return Some(
                McpErrorResponse::new(
                    McpErrorCode::InvalidInput,
                    format!("Invalid arguments for {name}: {detail}"),
                )
                .into(),
            );
        }

        let task = tokio::spawn((tool.handler)(args));

        let result = match task.await {
            Ok(Ok(text)) => ToolResult::text(text),
            Ok(Err(mcp_err)) => {
                warn!(tool = name, code = ?mcp_err.code(), "Tool failed: {}", mcp_err.error.message);
                mcp_err.into()
            }
            Err(join_err) => {
                error!(tool = name, "Tool task failed: {join_err}");
                McpErrorResponse::canonical(McpErrorCode::InternalError).into()
            }
        };
        Some(result)
    }

    fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.name == name)
    }
}
