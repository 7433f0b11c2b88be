//! OpenAI image generation provider.
//!
//! Providers return one of two payload shapes: inline base64
//! (`b64_json`, the gpt-image-1 default) or a short-lived remote URL
//! (the dall-e default). Both are normalized to [`EncodedImage`] here, so
//! downstream components only ever see one representation.

use async_openai::config::OpenAIConfig;
use async_openai::types::images::{
    CreateImageRequest, Image, ImageModel, ImageQuality as OpenAiImageQuality, ImageSize,
};
use async_openai::Client;
use base64::Engine;
use tracing::Instrument;

use robokit_core::llm::ImageProvider;
use robokit_observe::genai_attrs;
use robokit_types::image::EncodedImage;
use robokit_types::llm::{ImageQuality, ImageRequest, LlmError};

use crate::llm::openai_compat::map_openai_error;

/// Image provider backed by the OpenAI images API.
///
/// Does NOT derive Debug for the same API-key reason as
/// [`crate::llm::openai_compat::OpenAiCompatibleProvider`].
pub struct OpenAiImageProvider {
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
}

impl OpenAiImageProvider {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);

        Self {
            client: Client::with_config(openai_config),
            http: reqwest::Client::new(),
        }
    }

    /// Download a URL-shaped image result and re-encode it inline.
    async fn fetch_and_encode(&self, url: &str) -> Result<EncodedImage, LlmError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LlmError::Provider {
                message: format!("image download failed: {e}"),
            })?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        let bytes = response.bytes().await.map_err(|e| LlmError::Provider {
            message: format!("image download failed: {e}"),
        })?;

        Ok(EncodedImage {
            mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        })
    }
}

impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &str {
        "openai_images"
    }

    async fn generate(&self, request: &ImageRequest) -> Result<EncodedImage, LlmError> {
        let oai_request = CreateImageRequest {
            prompt: request.prompt.clone(),
            model: Some(ImageModel::Other(request.model.clone())),
            n: Some(1),
            size: Some(parse_size(&request.size)),
            quality: Some(match request.quality {
                ImageQuality::High => OpenAiImageQuality::High,
                ImageQuality::Standard => OpenAiImageQuality::Standard,
            }),
            ..Default::default()
        };

        let span = tracing::info_span!(
            "generate_image",
            { genai_attrs::GEN_AI_OPERATION_NAME } = genai_attrs::OP_GENERATE_IMAGE,
            { genai_attrs::GEN_AI_PROVIDER_NAME } = genai_attrs::PROVIDER_OPENAI,
            { genai_attrs::GEN_AI_REQUEST_MODEL } = request.model.as_str(),
        );

        let response = self
            .client
            .images()
            .generate(oai_request)
            .instrument(span)
            .await
            .map_err(map_openai_error)?;

        let image = response.data.first().ok_or(LlmError::EmptyResponse)?;
        match image.as_ref() {
            Image::B64Json { b64_json, .. } => Ok(EncodedImage::png(b64_json.as_str())),
            Image::Url { url, .. } => self.fetch_and_encode(&url).await,
        }
    }
}

fn parse_size(size: &str) -> ImageSize {
    match size {
        "256x256" => ImageSize::S256x256,
        "512x512" => ImageSize::S512x512,
        "1024x1024" => ImageSize::S1024x1024,
        "1792x1024" => ImageSize::S1792x1024,
        "1024x1792" => ImageSize::S1024x1792,
        _ => ImageSize::S1024x1024,
    }
}
