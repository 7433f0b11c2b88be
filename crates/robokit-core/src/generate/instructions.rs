//! Assembly-instructions generator.
//!
//! Builds a long structured prompt that forces the model to cross-reference
//! every BOM component and its quantity into enumerated assembly sections,
//! and to answer with `{"instructions": ..., "format": "pdf"|"markdown"}`.
//! Missing or unparsable content is pipeline-fatal under the orchestrator's
//! policy; an unknown format tag is coerced to markdown.

use std::sync::Arc;

use robokit_types::error::GenerateError;
use robokit_types::image::EncodedImage;
use robokit_types::llm::Message;
use robokit_types::payload::InstructionsPayload;
use robokit_types::project::{
    AssemblyInstructions, BomItem, GeneratedCode, InstructionFormat,
};

use super::call_structured;
use crate::llm::BoxChatProvider;

/// Sections the prompt requires, in order.
const REQUIRED_SECTIONS: &[&str] = &[
    "Overview",
    "Tools required",
    "Component inventory",
    "Mechanical assembly",
    "Wiring",
    "Verification",
    "Calibration",
    "Validation tests",
    "Troubleshooting",
    "Maintenance",
    "Final component reconciliation",
];

/// Inputs consumed by the instructions generator.
pub struct InstructionsInput<'a> {
    pub description: &'a str,
    pub bom: &'a [BomItem],
    pub code: &'a GeneratedCode,
    /// Circuit diagram attached as a vision part when present.
    pub circuit: Option<&'a EncodedImage>,
    /// OBJ mesh text from the optional 3D-model generator.
    pub model_3d: Option<&'a str>,
}

pub struct InstructionsGenerator {
    provider: Arc<BoxChatProvider>,
    model: String,
}

impl InstructionsGenerator {
    pub fn new(provider: Arc<BoxChatProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Generate the assembly instructions.
    pub async fn generate(
        &self,
        input: &InstructionsInput<'_>,
    ) -> Result<AssemblyInstructions, GenerateError> {
        let user_text = user_prompt(input);
        let user_message = match input.circuit {
            Some(diagram) => Message::user_with_image(user_text, diagram.clone()),
            None => Message::user(user_text),
        };

        let payload: InstructionsPayload = call_structured(
            &self.provider,
            &self.model,
            "InstructionsPayload",
            system_prompt(),
            user_message,
        )
        .await?;

        if payload.instructions.trim().is_empty() {
            return Err(GenerateError::MissingContent);
        }

        let format = payload
            .format
            .as_deref()
            .and_then(|tag| tag.parse::<InstructionFormat>().ok())
            .unwrap_or(InstructionFormat::Markdown);

        Ok(AssemblyInstructions {
            text: payload.instructions,
            format,
        })
    }
}

fn system_prompt() -> String {
    let sections = REQUIRED_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, section)| format!("{}. {section}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a technical writer for robotics kits. Write complete \
         assembly instructions for the described robot.\n\
         Hard requirements:\n\
         - Every component in the bill of materials must appear in the \
         assembly steps by its exact name, with its exact quantity.\n\
         - Structure the document into these numbered sections:\n{sections}\n\
         - The final section re-lists every component with where it was used.\n\
         Respond with strict JSON: an object with a string field \
         \"instructions\" and a field \"format\" that is either \"pdf\" or \
         \"markdown\". Nothing else."
    )
}

fn user_prompt(input: &InstructionsInput<'_>) -> String {
    let mut prompt = format!("Project description:\n{}\n\nBill of materials:\n", input.description);
    for item in input.bom {
        prompt.push_str(&format!(
            "- {} x{} ({})\n",
            item.component_name, item.quantity, item.description
        ));
    }
    prompt.push_str(&format!(
        "\nControl code ({}):\n{}\n",
        input.code.language, input.code.source
    ));
    if input.circuit.is_some() {
        prompt.push_str("\nThe circuit diagram for the wiring section is attached as an image.\n");
    }
    if let Some(obj) = input.model_3d {
        prompt.push_str(&format!("\n3D model of the chassis (OBJ format):\n{obj}\n"));
    }
    prompt
}
