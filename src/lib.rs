//! MCP server for a personal CSS tutor.
//!
//! Exposes `read_from_memory`, `write_to_memory`, and (with an API key)
//! `get_latest_updates` tools, the `memory://css_knowledge_memory/` resource,
//! and the `css-tutor-guidance` prompt over JSON-RPC 2.0 stdio transport.

pub mod config;
pub mod context;
pub mod handlers;
pub mod memory;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod upstream;

pub mod schema;
