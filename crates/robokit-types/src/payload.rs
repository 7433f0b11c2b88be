//! Schema-constrained generator payloads.
//!
//! Each generator asks the provider for strict JSON conforming to one of
//! these shapes, sent as a schemars-derived JSON schema via structured
//! output. Parsing is strict: a response that does not deserialize into the
//! declared payload is a typed parse failure, never an ad-hoc field read.

use serde::{Deserialize, Serialize};

use crate::project::BomItem;

/// Payload returned by the project-description generator.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionPayload {
    /// Refined project description used as shared context downstream.
    pub project_description: String,
}

/// Payload returned by the bill-of-materials generator.
///
/// `billOfMaterials` defaults to an empty list when the key is missing; a
/// malformed response therefore yields "no components" rather than a parse
/// error at this layer.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BomPayload {
    #[serde(default)]
    pub bill_of_materials: Vec<BomItem>,
}

/// Payload returned by the code generator.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CodePayload {
    /// Complete control code for the target platform.
    pub code: String,
}

/// Payload returned by the assembly-instructions generator.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstructionsPayload {
    /// Full instruction text, structured into the required sections.
    pub instructions: String,
    /// Output format tag. Kept as a free string here: anything outside
    /// {pdf, markdown} is coerced to markdown by the generator rather than
    /// failing the parse.
    #[serde(default)]
    pub format: Option<String>,
}

/// Payload returned by the optional OBJ 3D-model generator.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjModelPayload {
    /// Literal OBJ-format mesh text (vertices, normals, faces).
    pub obj_file_content: String,
    /// Suggested filename, without extension.
    pub file_name: String,
}

/// Recursively set `additionalProperties: false` on every object schema.
///
/// Structured output endpoints in strict mode require closed object schemas;
/// schemars does not emit the field by default.
pub fn add_additional_properties_false(schema: &mut serde_json::Value) {
    match schema {
        serde_json::Value::Object(map) => {
            let is_object_schema = map
                .get("type")
                .and_then(|t| t.as_str())
                .is_some_and(|t| t == "object")
                || map.contains_key("properties");
            if is_object_schema {
                map.entry("additionalProperties")
                    .or_insert(serde_json::Value::Bool(false));
            }
            for value in map.values_mut() {
                add_additional_properties_false(value);
            }
        }
        serde_json::Value::Array(items) => {
            for value in items {
                add_additional_properties_false(value);
            }
        }
        _ => {}
    }
}

/// Generate the strict JSON schema for a payload type.
pub fn strict_schema_for<T: schemars::JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    let mut value =
        serde_json::to_value(schema).expect("payload schema serialization should not fail");
    add_additional_properties_false(&mut value);
    value
}
