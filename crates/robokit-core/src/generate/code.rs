//! Control-code generator.
//!
//! Requests working control code for the target platform as a single
//! `{"code": "..."}` object. There is no static validation of the returned
//! source; correctness is delegated to the model. Failures here are
//! pipeline-fatal under the orchestrator's policy.

use std::sync::Arc;

use robokit_types::error::GenerateError;
use robokit_types::llm::Message;
use robokit_types::payload::CodePayload;
use robokit_types::project::{GeneratedCode, Platform};

use super::call_structured;
use crate::llm::BoxChatProvider;

pub struct CodeGenerator {
    provider: Arc<BoxChatProvider>,
    model: String,
}

impl CodeGenerator {
    pub fn new(provider: Arc<BoxChatProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Generate control code for the project on the given platform.
    pub async fn generate(
        &self,
        description: &str,
        platform: Platform,
    ) -> Result<GeneratedCode, GenerateError> {
        let payload: CodePayload = call_structured(
            &self.provider,
            &self.model,
            "CodePayload",
            system_prompt(platform),
            Message::user(format!("Project description:\n\n{description}")),
        )
        .await?;

        if payload.code.trim().is_empty() {
            return Err(GenerateError::MissingContent);
        }

        tracing::debug!(
            platform = %platform,
            bytes = payload.code.len(),
            "control code generated"
        );
        Ok(GeneratedCode {
            source: payload.code,
            language: platform.code_language(),
        })
    }
}

fn system_prompt(platform: Platform) -> String {
    format!(
        "You are an embedded robotics programmer. Write complete, working \
         {language} control code for the described robot, targeting a \
         {platform}. Include pin assignments, a main control loop, and short \
         comments on non-obvious sections. The code must be a single file \
         that compiles/runs as-is on the target.\n\
         Respond with a JSON object containing a single string field \
         \"code\". No markdown fences, no prose outside the JSON.",
        language = platform.code_language(),
        platform = platform.display_name(),
    )
}
