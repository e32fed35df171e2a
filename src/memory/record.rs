use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The persisted knowledge profile: which CSS concepts one user knows.
///
/// Concepts are kept in a sorted map so serialized output is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    #[serde(rename = "user_id")]
    pub owner_id: String,
    pub known_concepts: BTreeMap<String, bool>,
}

impl KnowledgeRecord {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            known_concepts: BTreeMap::new(),
        }
    }

    pub fn with_concept(mut self, concept: impl Into<String>, known: bool) -> Self {
        self.known_concepts.insert(concept.into(), known);
        self
    }

    /// `None` when the concept has never been recorded.
    pub fn is_known(&self, concept: &str) -> Option<bool> {
        self.known_concepts.get(concept).copied()
    }
}

/// JSON Schema for the on-disk record. Applied on every load and save.
pub fn record_schema() -> Value {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "CSS knowledge record",
        "type": "object",
        "required": ["user_id", "known_concepts"],
        "additionalProperties": false,
        "properties": {
            "user_id": {
                "type": "string",
                "minLength": 1
            },
            "known_concepts": {
                "type": "object",
                "additionalProperties": { "type": "boolean" }
            }
        }
    })
}

/// Return a copy of `current` with `concept` set to `known`.
///
/// Every other concept is carried over untouched. Storage is not involved.
pub fn update_concept(current: &KnowledgeRecord, concept: &str, known: bool) -> KnowledgeRecord {
    let mut next = current.clone();
    next.known_concepts.insert(concept.to_string(), known);
    next
}
