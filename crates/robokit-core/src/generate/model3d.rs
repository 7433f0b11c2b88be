//! Optional OBJ 3D-model generator.
//!
//! Asks a text model to emit literal OBJ-format mesh geometry (vertices,
//! normals, faces) for the robot chassis as a text artifact. Not part of the
//! required pipeline: it only runs when `enable_3d_model` is set, and its
//! failures are soft-recovered to an empty field.

use std::sync::Arc;

use robokit_types::error::GenerateError;
use robokit_types::llm::Message;
use robokit_types::payload::ObjModelPayload;
use robokit_types::project::BomItem;

use super::call_structured;
use crate::llm::BoxChatProvider;

/// OBJ mesh text plus its suggested file name.
#[derive(Debug, Clone)]
pub struct ObjModel {
    pub content: String,
    pub file_name: String,
}

pub struct ObjModelGenerator {
    provider: Arc<BoxChatProvider>,
    model: String,
}

impl ObjModelGenerator {
    pub fn new(provider: Arc<BoxChatProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Generate an OBJ mesh for the robot chassis.
    pub async fn generate(
        &self,
        description: &str,
        bom: &[BomItem],
    ) -> Result<ObjModel, GenerateError> {
        let mut user = format!("Project description:\n{description}\n\nMain components:\n");
        for item in bom {
            user.push_str(&format!("- {} x{}\n", item.component_name, item.quantity));
        }

        let payload: ObjModelPayload = call_structured(
            &self.provider,
            &self.model,
            "ObjModelPayload",
            system_prompt(),
            Message::user(user),
        )
        .await?;

        if payload.obj_file_content.trim().is_empty() {
            return Err(GenerateError::MissingContent);
        }

        let file_name = if payload.file_name.trim().is_empty() {
            "model".to_string()
        } else {
            payload.file_name
        };

        Ok(ObjModel {
            content: payload.obj_file_content,
            file_name,
        })
    }
}

fn system_prompt() -> String {
    "You are a 3D modeling assistant. Produce a simplified but valid \
     Wavefront OBJ mesh of the robot's chassis and visible major components. \
     Use `v` vertex, `vn` normal, and `f` face statements; keep the mesh \
     under 2000 faces; center it on the origin with +Z up.\n\
     Respond with strict JSON: an object with string fields \
     \"objFileContent\" (the literal OBJ text) and \"fileName\" (base name \
     without extension). Nothing else."
        .to_string()
}
