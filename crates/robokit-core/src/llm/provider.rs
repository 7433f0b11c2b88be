//! ChatProvider and ImageProvider trait definitions.
//!
//! These are the core abstractions the infrastructure layer implements.
//! Both use RPITIT; object-safe boxed variants live in
//! [`super::box_provider`].

use robokit_types::image::EncodedImage;
use robokit_types::llm::{CompletionRequest, CompletionResponse, ImageRequest, LlmError};

/// Trait for chat completion backends (OpenAI-compatible and friends).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Implementations
/// live in robokit-infra (e.g., `OpenAiCompatibleProvider`).
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}

/// Trait for image generation backends.
///
/// Implementations normalize whatever the provider returns (inline base64
/// or a remote URL) to an [`EncodedImage`] before it leaves the adapter.
pub trait ImageProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai_images").
    fn name(&self) -> &str;

    /// Generate a single image for the given prompt/model/size/quality.
    fn generate(
        &self,
        request: &ImageRequest,
    ) -> impl std::future::Future<Output = Result<EncodedImage, LlmError>> + Send;
}
