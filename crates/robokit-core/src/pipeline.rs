//! Pipeline orchestrator.
//!
//! Sequences the generators for one project request:
//!
//! 1. project description (everything downstream consumes it)
//! 2. bill of materials (image/3D prompts consume it)
//! 3. code + images + optional 3D model, concurrently
//! 4. assembly instructions, last
//!
//! The recovery policy lives here and only here: description, BOM, images,
//! and 3D model soft-recover to defaults; code and instructions are
//! pipeline-fatal. Generators themselves just return typed failures.
//!
//! No retry-with-backoff beyond the image-model fallback, no cancellation,
//! no partial-result persistence: a fatal failure discards the request.

use std::sync::Arc;

use robokit_types::error::PipelineError;
use robokit_types::project::{ProjectRequest, ProjectResult};

use crate::generate::bom::BomGenerator;
use crate::generate::code::CodeGenerator;
use crate::generate::description::{fallback_description, DescriptionGenerator};
use crate::generate::image::{ImageGenerator, ImageModels};
use crate::generate::instructions::{InstructionsGenerator, InstructionsInput};
use crate::generate::model3d::{ObjModel, ObjModelGenerator};
use crate::llm::{BoxChatProvider, BoxImageProvider};

/// Model identifiers and feature flags for one pipeline instance.
///
/// Model identifiers are fixed constants resolved at startup (from
/// `config.toml` or the defaults below), never per-request.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Text-only chat model (BOM, code, instructions, 3D model).
    pub text_model: String,
    /// Vision-capable chat model (sketch-grounded description, refinement).
    pub vision_model: String,
    /// Primary and fallback image generation models.
    pub image_models: ImageModels,
    /// Run the concept-image refinement pass.
    pub refine_images: bool,
    /// Run the OBJ 3D-model generator.
    pub enable_3d_model: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_model: "gpt-4o-mini".to_string(),
            vision_model: "gpt-4o".to_string(),
            image_models: ImageModels {
                primary: "gpt-image-1".to_string(),
                secondary: "dall-e-3".to_string(),
            },
            refine_images: false,
            enable_3d_model: false,
        }
    }
}

/// The orchestrator owning the five generators.
pub struct Pipeline {
    description: DescriptionGenerator,
    bom: BomGenerator,
    code: CodeGenerator,
    images: ImageGenerator,
    instructions: InstructionsGenerator,
    model3d: Option<ObjModelGenerator>,
}

impl Pipeline {
    pub fn new(
        chat: Arc<BoxChatProvider>,
        images: Arc<BoxImageProvider>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            description: DescriptionGenerator::new(
                Arc::clone(&chat),
                config.text_model.clone(),
                config.vision_model.clone(),
            ),
            bom: BomGenerator::new(Arc::clone(&chat), config.text_model.clone()),
            code: CodeGenerator::new(Arc::clone(&chat), config.text_model.clone()),
            images: ImageGenerator::new(
                images,
                Arc::clone(&chat),
                config.image_models,
                config.vision_model,
                config.refine_images,
            ),
            instructions: InstructionsGenerator::new(
                Arc::clone(&chat),
                config.text_model.clone(),
            ),
            model3d: config
                .enable_3d_model
                .then(|| ObjModelGenerator::new(chat, config.text_model)),
        }
    }

    /// Run the full pipeline for one validated request.
    #[tracing::instrument(skip_all, fields(platform = %request.platform))]
    pub async fn run(&self, request: &ProjectRequest) -> Result<ProjectResult, PipelineError> {
        let description = match self.description.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "description generation failed, echoing user input");
                fallback_description(&request.description)
            }
        };

        let bom = match self.bom.generate(&description).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "BOM generation failed, continuing with empty list");
                Vec::new()
            }
        };

        let (code, mut images, model_3d) = tokio::join!(
            self.code.generate(&description, request.platform),
            self.images.generate_set(&description, &bom),
            self.generate_model_3d(&description, &bom),
        );

        let code = code.map_err(|source| PipelineError::Fatal {
            generator: "code",
            source,
        })?;

        if let Some(model) = model_3d {
            images.model_3d = Some(model.content);
        }

        let instructions = self
            .instructions
            .generate(&InstructionsInput {
                description: &description,
                bom: &bom,
                code: &code,
                circuit: images.circuit.as_ref(),
                model_3d: images.model_3d.as_deref(),
            })
            .await
            .map_err(|source| PipelineError::Fatal {
                generator: "instructions",
                source,
            })?;

        tracing::info!(
            bom_items = bom.len(),
            has_concept = images.concept.is_some(),
            has_circuit = images.circuit.is_some(),
            "pipeline complete"
        );

        Ok(ProjectResult {
            platform: request.platform,
            description,
            bill_of_materials: bom,
            code,
            images,
            instructions,
        })
    }

    /// 3D-model step, or `None` when disabled or failed (soft recovery).
    async fn generate_model_3d(&self, description: &str, bom: &[robokit_types::project::BomItem]) -> Option<ObjModel> {
        let generator = self.model3d.as_ref()?;
        match generator.generate(description, bom).await {
            Ok(model) => Some(model),
            Err(e) => {
                tracing::warn!(error = %e, "3D model generation failed, leaving field empty");
                None
            }
        }
    }
}
