//! Knowledge profile persistence and its resource view.

pub mod record;
pub mod resource;
pub mod store;

pub use record::{record_schema, update_concept, KnowledgeRecord};
pub use resource::{MemoryResource, RESOURCE_MIME_TYPE, RESOURCE_NAME, RESOURCE_URI};
pub use store::{KnowledgeStore, StoreError};
