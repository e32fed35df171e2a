use jsonschema::{validator_for, Validator};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("Instance validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}

/// A JSON Schema (draft 2020-12) compiled once and checked many times.
///
/// Used for the persisted knowledge record and for every tool's input shape.
pub struct SchemaValidator {
    schema: Value,
    validator: Validator,
}

impl SchemaValidator {
    pub fn compile(schema: Value) -> Result<Self, SchemaValidationError> {
        let validator = validator_for(&schema)
            .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;
        Ok(Self { schema, validator })
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check an instance, collecting every violated constraint.
    pub fn check(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed(violations))
        }
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
/// Returns Ok(()) if valid, Err otherwise.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;
    let instance_json: Value = serde_json::from_str(instance_str)?;

    SchemaValidator::compile(schema_json)?.check(&instance_json)
}
