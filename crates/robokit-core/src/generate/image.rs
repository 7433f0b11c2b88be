//! Concept-image and circuit-diagram generator.
//!
//! Each image follows the same two-tier protocol: try the primary image
//! model once, and on failure retry exactly once with the secondary model
//! at a lower quality tier. Both failing degrades to `None` for that image;
//! image generation never aborts the pipeline.
//!
//! An optional refinement pass describes the concept image back to the
//! vision model and regenerates it with a photorealism/text-legibility
//! enhancement prompt, keeping the original if anything fails.

use std::sync::Arc;

use robokit_types::image::{EncodedImage, GeneratedImages};
use robokit_types::llm::{
    CompletionRequest, ImageQuality, ImageRequest, Message,
};
use robokit_types::project::BomItem;

use crate::llm::{BoxChatProvider, BoxImageProvider};

/// Fixed generation resolution for both images.
const IMAGE_SIZE: &str = "1024x1024";

/// Token budget for the refinement description call.
const DESCRIBE_MAX_TOKENS: u32 = 1024;

/// Primary and fallback image model identifiers.
#[derive(Debug, Clone)]
pub struct ImageModels {
    pub primary: String,
    pub secondary: String,
}

pub struct ImageGenerator {
    images: Arc<BoxImageProvider>,
    chat: Arc<BoxChatProvider>,
    models: ImageModels,
    vision_model: String,
    refine: bool,
}

impl ImageGenerator {
    pub fn new(
        images: Arc<BoxImageProvider>,
        chat: Arc<BoxChatProvider>,
        models: ImageModels,
        vision_model: String,
        refine: bool,
    ) -> Self {
        Self {
            images,
            chat,
            models,
            vision_model,
            refine,
        }
    }

    /// Generate the concept image and circuit diagram for a project.
    ///
    /// The two generations run concurrently. Fields are `None` where both
    /// model tiers failed.
    pub async fn generate_set(&self, description: &str, bom: &[BomItem]) -> GeneratedImages {
        let concept_prompt = concept_prompt(description);
        let circuit_prompt = circuit_prompt(description, bom);
        let (concept, circuit) = tokio::join!(
            self.generate_one(&concept_prompt),
            self.generate_one(&circuit_prompt),
        );

        let concept = match (self.refine, concept) {
            (true, Some(original)) => match self.refine_concept(&original).await {
                Some(refined) => Some(refined),
                None => Some(original),
            },
            (_, concept) => concept,
        };

        GeneratedImages {
            concept,
            circuit,
            model_3d: None,
            suggested_filename: suggested_filename(description),
        }
    }

    /// One image, at most two attempts: primary then secondary.
    async fn generate_one(&self, prompt: &str) -> Option<EncodedImage> {
        let primary = ImageRequest {
            prompt: prompt.to_string(),
            model: self.models.primary.clone(),
            size: IMAGE_SIZE.to_string(),
            quality: ImageQuality::High,
        };
        match self.images.generate(&primary).await {
            Ok(image) => return Some(image),
            Err(e) => {
                tracing::warn!(model = %self.models.primary, error = %e, "primary image model failed, trying fallback");
            }
        }

        let secondary = ImageRequest {
            prompt: prompt.to_string(),
            model: self.models.secondary.clone(),
            size: IMAGE_SIZE.to_string(),
            quality: ImageQuality::Standard,
        };
        match self.images.generate(&secondary).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(model = %self.models.secondary, error = %e, "fallback image model failed, skipping image");
                None
            }
        }
    }

    /// Describe the concept image back to the vision model, then regenerate
    /// with an enhancement prompt. Returns `None` when any step fails.
    async fn refine_concept(&self, original: &EncodedImage) -> Option<EncodedImage> {
        let describe = CompletionRequest {
            model: self.vision_model.clone(),
            messages: vec![Message::user_with_image(
                "Describe this robot concept image in precise visual detail: \
                 form factor, materials, colors, labeled parts, and background."
                    .to_string(),
                original.clone(),
            )],
            system: None,
            max_tokens: DESCRIBE_MAX_TOKENS,
            temperature: Some(0.3),
            output_config: None,
        };

        let described = match self.chat.complete(&describe).await {
            Ok(response) if !response.content.trim().is_empty() => response.content,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "refinement description failed, keeping original image");
                return None;
            }
        };

        let request = ImageRequest {
            prompt: format!(
                "{described}\n\nRender this exact robot as a photorealistic \
                 product shot. Any labels or text in the image must be crisp \
                 and legible."
            ),
            model: self.models.primary.clone(),
            size: IMAGE_SIZE.to_string(),
            quality: ImageQuality::High,
        };
        match self.images.generate(&request).await {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(error = %e, "refinement render failed, keeping original image");
                None
            }
        }
    }
}

fn concept_prompt(description: &str) -> String {
    format!(
        "Concept illustration of a hobbyist robot, clean studio render on a \
         neutral background, showing the full build:\n\n{description}"
    )
}

fn circuit_prompt(description: &str, bom: &[BomItem]) -> String {
    let mut prompt = format!(
        "Clear electronics wiring diagram for this robot project, flat \
         schematic style with labeled components and wire colors:\n\n\
         {description}\n\nComponents to wire:\n"
    );
    for item in bom {
        prompt.push_str(&format!("- {} x{}\n", item.component_name, item.quantity));
    }
    prompt
}

/// Filesystem-safe base name derived from the first words of the description.
fn suggested_filename(description: &str) -> String {
    let slug: Vec<String> = description
        .split_whitespace()
        .take(4)
        .map(|word| {
            word.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect();
    if slug.is_empty() {
        "robot_project".to_string()
    } else {
        slug.join("_")
    }
}

#[cfg(test)]
mod tests {
    use robokit_types::llm::LlmError;

    use super::*;
    use crate::generate::testutil::{MockChatProvider, MockImageProvider};

    fn image(data: &str) -> EncodedImage {
        EncodedImage::png(data)
    }

    fn provider_err() -> Result<EncodedImage, LlmError> {
        Err(LlmError::Provider {
            message: "model unavailable".to_string(),
        })
    }

    fn generator(
        images: MockImageProvider,
        chat: MockChatProvider,
        refine: bool,
    ) -> ImageGenerator {
        ImageGenerator::new(
            Arc::new(BoxImageProvider::new(images)),
            Arc::new(BoxChatProvider::new(chat)),
            ImageModels {
                primary: "img-primary".to_string(),
                secondary: "img-secondary".to_string(),
            },
            "vision-model".to_string(),
            refine,
        )
    }

    #[tokio::test]
    async fn test_primary_success_is_single_attempt() {
        let images = MockImageProvider::with_script(vec![Ok(image("cHJpbWFyeQ=="))]);
        let log = images.request_log();
        let generator = generator(images, MockChatProvider::with_response("unused"), false);

        let result = generator.generate_one("a robot").await;
        assert_eq!(result, Some(image("cHJpbWFyeQ==")));

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "img-primary");
        assert_eq!(requests[0].quality, ImageQuality::High);
        assert_eq!(requests[0].size, IMAGE_SIZE);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_exactly_once() {
        let images =
            MockImageProvider::with_script(vec![provider_err(), Ok(image("ZmFsbGJhY2s="))]);
        let log = images.request_log();
        let generator = generator(images, MockChatProvider::with_response("unused"), false);

        let result = generator.generate_one("a robot").await;
        assert_eq!(result, Some(image("ZmFsbGJhY2s=")));

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].model, "img-secondary");
        assert_eq!(requests[1].quality, ImageQuality::Standard);
    }

    #[tokio::test]
    async fn test_both_tiers_failing_yields_none_after_two_attempts() {
        let images = MockImageProvider::always_failing();
        let log = images.request_log();
        let generator = generator(images, MockChatProvider::with_response("unused"), false);

        let result = generator.generate_one("a robot").await;
        assert!(result.is_none());
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_generate_set_total_failure_is_empty_not_error() {
        let images = MockImageProvider::always_failing();
        let log = images.request_log();
        let generator = generator(images, MockChatProvider::with_response("unused"), false);

        let set = generator.generate_set("a robot dog", &[]).await;
        assert!(set.concept.is_none());
        assert!(set.circuit.is_none());
        // Two attempts per image, two images.
        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_circuit_prompt_lists_components() {
        let bom = vec![BomItem {
            component_name: "Servo SG90".to_string(),
            description: "Micro servo".to_string(),
            quantity: 2,
            purchase_link: "https://example.com".to_string(),
            unit_price: 3.95,
        }];
        let prompt = circuit_prompt("a robot arm", &bom);
        assert!(prompt.contains("Servo SG90 x2"));
    }

    #[tokio::test]
    async fn test_refinement_replaces_concept_on_success() {
        // Same value for both first-tier generations so join! ordering does
        // not matter; the third scripted reply is the refined render.
        let images = MockImageProvider::with_script(vec![
            Ok(image("b3JpZ2luYWw=")),
            Ok(image("b3JpZ2luYWw=")),
            Ok(image("cmVmaW5lZA==")),
        ]);
        let chat = MockChatProvider::with_response("a silver hexapod robot on white");
        let generator = generator(images, chat, true);

        let set = generator.generate_set("a hexapod robot", &[]).await;
        assert_eq!(set.concept, Some(image("cmVmaW5lZA==")));
        assert_eq!(set.circuit, Some(image("b3JpZ2luYWw=")));
    }

    #[tokio::test]
    async fn test_refinement_failure_keeps_original() {
        let images = MockImageProvider::with_script(vec![
            Ok(image("b3JpZ2luYWw=")),
            Ok(image("b3JpZ2luYWw=")),
            provider_err(),
        ]);
        let chat = MockChatProvider::with_response("a silver hexapod robot on white");
        let generator = generator(images, chat, true);

        let set = generator.generate_set("a hexapod robot", &[]).await;
        assert_eq!(set.concept, Some(image("b3JpZ2luYWw=")));
    }

    #[tokio::test]
    async fn test_refinement_describe_failure_keeps_original() {
        let images = MockImageProvider::with_script(vec![
            Ok(image("b3JpZ2luYWw=")),
            Ok(image("b3JpZ2luYWw=")),
        ]);
        let chat = MockChatProvider::failing("vision down");
        let generator = generator(images, chat, true);

        let set = generator.generate_set("a hexapod robot", &[]).await;
        assert_eq!(set.concept, Some(image("b3JpZ2luYWw=")));
        assert_eq!(set.circuit, Some(image("b3JpZ2luYWw=")));
    }

    #[test]
    fn test_suggested_filename_slug() {
        assert_eq!(
            suggested_filename("A small robot, that follows lines!"),
            "a_small_robot_that"
        );
        assert_eq!(suggested_filename("!!! ???"), "robot_project");
    }
}
