//! Application state wiring the providers into the pipeline.
//!
//! The pipeline is generic over its provider ports; AppState pins them to
//! the concrete OpenAI-backed implementations from robokit-infra.

use std::path::Path;
use std::sync::Arc;

use secrecy::ExposeSecret;

use robokit_core::generate::image::ImageModels;
use robokit_core::llm::{BoxChatProvider, BoxImageProvider};
use robokit_core::pipeline::{Pipeline, PipelineConfig};
use robokit_infra::config::{load_service_config, resolve_api_key, ServiceConfig};
use robokit_infra::image::openai::OpenAiImageProvider;
use robokit_infra::llm::openai_compat::config::OpenAiCompatConfig;
use robokit_infra::llm::openai_compat::OpenAiCompatibleProvider;

/// Shared application state holding the pipeline and service configuration.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: ServiceConfig,
}

impl AppState {
    /// Initialize the application state: load config, resolve the API key,
    /// wire the providers into the pipeline.
    pub async fn init(config_dir: &Path) -> anyhow::Result<Self> {
        let config = load_service_config(config_dir).await;
        let api_key = resolve_api_key()?;

        let chat = OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            provider_name: "openai".to_string(),
            base_url: config.base_url.clone(),
            api_key: api_key.expose_secret().to_string(),
            model: config.text_model.clone(),
        });
        let images = OpenAiImageProvider::new(api_key.expose_secret(), &config.base_url);

        let pipeline = Pipeline::new(
            Arc::new(BoxChatProvider::new(chat)),
            Arc::new(BoxImageProvider::new(images)),
            pipeline_config(&config),
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            config,
        })
    }
}

fn pipeline_config(config: &ServiceConfig) -> PipelineConfig {
    PipelineConfig {
        text_model: config.text_model.clone(),
        vision_model: config.vision_model.clone(),
        image_models: ImageModels {
            primary: config.image_model_primary.clone(),
            secondary: config.image_model_secondary.clone(),
        },
        refine_images: config.refine_images,
        enable_3d_model: config.enable_3d_model,
    }
}
