//! Bill-of-materials generator.
//!
//! Asks the model for 8-15 retail-purchasable components with explicit
//! positive integer quantities, constrained to the [`BomPayload`] schema.
//! A response missing the `billOfMaterials` key parses to an empty list at
//! the payload layer; whether an empty/failed BOM is acceptable is the
//! orchestrator's call.

use std::sync::Arc;

use robokit_types::error::GenerateError;
use robokit_types::llm::Message;
use robokit_types::payload::BomPayload;
use robokit_types::project::BomItem;

use super::call_structured;
use crate::llm::BoxChatProvider;

/// Retail sources the prompt steers component selection toward.
const PREFERRED_RETAILERS: &[&str] = &["Amazon", "Adafruit", "SparkFun", "Pololu", "AliExpress"];

const MIN_COMPONENTS: usize = 8;
const MAX_COMPONENTS: usize = 15;

pub struct BomGenerator {
    provider: Arc<BoxChatProvider>,
    model: String,
}

impl BomGenerator {
    pub fn new(provider: Arc<BoxChatProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Generate the component list for a project description.
    pub async fn generate(&self, description: &str) -> Result<Vec<BomItem>, GenerateError> {
        let payload: BomPayload = call_structured(
            &self.provider,
            &self.model,
            "BomPayload",
            system_prompt(),
            Message::user(format!("Project description:\n\n{description}")),
        )
        .await?;

        tracing::debug!(items = payload.bill_of_materials.len(), "BOM generated");
        Ok(payload.bill_of_materials)
    }
}

fn system_prompt() -> String {
    format!(
        "You are a robotics sourcing specialist. Produce a complete bill of \
         materials for the described robot project.\n\
         Rules:\n\
         - Between {MIN_COMPONENTS} and {MAX_COMPONENTS} components.\n\
         - Every quantity is an explicit positive integer.\n\
         - Prefer affordable parts from these retailers: {retailers}.\n\
         - Each purchaseLink is a plausible product page URL at one of those \
         retailers.\n\
         - unitPrice is the price per single unit in USD.\n\
         Respond with strict JSON: an object with one key \"billOfMaterials\" \
         holding an array of objects with fields componentName, description, \
         quantity, purchaseLink, unitPrice. Nothing else.",
        retailers = PREFERRED_RETAILERS.join(", "),
    )
}
