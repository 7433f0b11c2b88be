//! Project-description generator.
//!
//! Refines the user's free-text robot idea (optionally grounded by a sketch
//! image) into the project description every downstream generator consumes
//! as shared context. Uses a vision-capable model variant when an image is
//! attached, a text-only model otherwise.

use std::sync::Arc;

use robokit_types::error::GenerateError;
use robokit_types::llm::Message;
use robokit_types::payload::DescriptionPayload;
use robokit_types::project::ProjectRequest;

use super::call_structured;
use crate::llm::BoxChatProvider;

/// Fixed phrase used by the orchestrator when description generation fails
/// and the raw user input is echoed instead.
pub fn fallback_description(user_text: &str) -> String {
    format!("A custom robotics project based on this idea: {user_text}")
}

pub struct DescriptionGenerator {
    provider: Arc<BoxChatProvider>,
    text_model: String,
    vision_model: String,
}

impl DescriptionGenerator {
    pub fn new(provider: Arc<BoxChatProvider>, text_model: String, vision_model: String) -> Self {
        Self {
            provider,
            text_model,
            vision_model,
        }
    }

    /// Generate the refined project description.
    pub async fn generate(&self, request: &ProjectRequest) -> Result<String, GenerateError> {
        let model = if request.image.is_some() {
            &self.vision_model
        } else {
            &self.text_model
        };

        let user_message = match &request.image {
            Some(image) => Message::user_with_image(request.description.clone(), image.clone()),
            None => Message::user(request.description.clone()),
        };

        let payload: DescriptionPayload = call_structured(
            &self.provider,
            model,
            "DescriptionPayload",
            system_prompt(request),
            user_message,
        )
        .await?;

        if payload.project_description.trim().is_empty() {
            return Err(GenerateError::MissingContent);
        }

        tracing::debug!(
            chars = payload.project_description.len(),
            "project description generated"
        );
        Ok(payload.project_description)
    }
}

fn system_prompt(request: &ProjectRequest) -> String {
    let sketch_note = if request.image.is_some() {
        "The user attached a sketch of the robot; use it to resolve ambiguity \
         in the text and mention any notable mechanical features it shows.\n"
    } else {
        ""
    };
    format!(
        "You are a robotics project planner. Given a short robot idea, write a \
         clear 2-4 paragraph project description covering what the robot does, \
         its main mechanical structure, and how a hobbyist would interact with \
         it. The robot will be controlled by a {platform}.\n\
         {sketch_note}\
         Respond with a JSON object containing a single string field \
         \"projectDescription\". No other fields, no prose outside the JSON.",
        platform = request.platform.display_name(),
    )
}
