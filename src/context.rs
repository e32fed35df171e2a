use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::{get_latest_updates, read_from_memory, write_to_memory};
use crate::memory::{KnowledgeStore, MemoryResource};
use crate::registry::{Predicate, Registration, RegistryError, ToolRegistry};
use crate::schema::SchemaValidationError;
use crate::upstream::{UpdateFetcher, UpstreamError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Knowledge record schema: {0}")]
    Schema(#[from] SchemaValidationError),
    #[error("Tool registration: {0}")]
    Registry(#[from] RegistryError),
    #[error("Upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Dependencies handed to each tool registration.
#[derive(Debug, Clone)]
pub struct Services {
    pub store: Arc<KnowledgeStore>,
    pub fetcher: Option<Arc<UpdateFetcher>>,
}

/// Everything a request handler needs, built once at startup.
#[derive(Debug)]
pub struct ServerContext {
    pub services: Services,
    pub tools: ToolRegistry,
    pub memory: MemoryResource,
}

fn always(_: &Services) -> bool {
    true
}

fn has_fetcher(services: &Services) -> bool {
    services.fetcher.is_some()
}

fn tool_table() -> [(Predicate<Services>, Registration<Services>); 3] {
    [
        (always, read_from_memory::register),
        (always, write_to_memory::register),
        (has_fetcher, get_latest_updates::register),
    ]
}

impl ServerContext {
    pub fn new(config: &ServerConfig) -> Result<Self, StartupError> {
        let store = Arc::new(KnowledgeStore::new(&config.memory_path)?);
        info!(path = %store.path().display(), "Knowledge store ready");

        let fetcher = match &config.upstream {
            Some(upstream) => {
                let fetcher = UpdateFetcher::new(upstream)?;
                info!(endpoint = fetcher.endpoint(), "get_latest_updates enabled");
                Some(Arc::new(fetcher))
            }
            None => {
                warn!("OPENROUTER_API_KEY not set; get_latest_updates will not be registered");
                None
            }
        };

        let services = Services { store, fetcher };
        let tools = ToolRegistry::build(&services, &tool_table())?;
        let memory = MemoryResource::new(services.store.clone());

        Ok(Self {
            services,
            tools,
            memory,
        })
    }
}
