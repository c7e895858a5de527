//! JSON schema for the software management configuration file.

use serde_json::{Value, json};
use tracing::debug;

use crate::errors::SmError;

/// Schema every uploaded configuration must satisfy.
#[must_use]
pub fn sm_config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "enabled": {"type": "boolean"},
            "items": {
                "type": "array",
                "items": {"$ref": "#/$defs/item"}
            },
            "version": {"type": "string"}
        },
        "required": ["enabled", "items", "version"],
        "$defs": {
            "item": {
                "type": "object",
                "properties": {
                    "package": {"type": "string"},
                    "config_files": {
                        "type": "array",
                        "items": {"$ref": "#/$defs/cfg"}
                    },
                    "parameters": {
                        "type": "array",
                        "items": {"$ref": "#/$defs/param"}
                    }
                },
                "required": ["config_files"]
            },
            "cfg": {
                "type": "object",
                "properties": {
                    "config_template": {"type": "string"},
                    "config_location": {"type": "string"}
                },
                "required": ["config_template", "config_location"]
            },
            "param": {
                "type": "object",
                "properties": {
                    "key": {"type": "string"},
                    "value": {"type": "string"}
                }
            }
        }
    })
}

/// Validates `document`, reporting every violation rather than the first.
///
/// # Errors
///
/// Returns [`SmError::ValidationError`] listing each violation as
/// `<instance path>: <message>`.
pub fn validate(document: &Value) -> Result<(), SmError> {
    let schema = sm_config_schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| SmError::ConfigError(format!("invalid built-in schema: {e}")))?;

    let violations: Vec<String> = validator
        .iter_errors(document)
        .map(|error| {
            let path = error.instance_path.to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            format!("{path}: {error}")
        })
        .collect();

    if violations.is_empty() {
        debug!("Configuration passed schema validation");
        Ok(())
    } else {
        Err(SmError::ValidationError(violations))
    }
}
