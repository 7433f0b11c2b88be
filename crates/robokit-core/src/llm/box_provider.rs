//! Object-safe dynamic dispatch wrappers for the provider traits.
//!
//! Same blanket-impl pattern for both providers:
//! 1. Define an object-safe `*Dyn` trait with boxed futures
//! 2. Blanket-impl it for all trait implementors
//! 3. The `Box*Provider` wrapper holds `Box<dyn *Dyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use robokit_types::image::EncodedImage;
use robokit_types::llm::{CompletionRequest, CompletionResponse, ImageRequest, LlmError};

use super::provider::{ChatProvider, ImageProvider};

/// Object-safe version of [`ChatProvider`] with boxed futures.
pub trait ChatProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;
}

impl<T: ChatProvider> ChatProviderDyn for T {
    fn name(&self) -> &str {
        ChatProvider::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased chat provider for runtime backend selection.
///
/// `ChatProvider` uses RPITIT and cannot be a trait object directly;
/// this wrapper provides equivalent methods over the `ChatProviderDyn`
/// trait object.
pub struct BoxChatProvider {
    inner: Box<dyn ChatProviderDyn + Send + Sync>,
}

impl BoxChatProvider {
    /// Wrap a concrete `ChatProvider` in a type-erased box.
    pub fn new<T: ChatProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }
}

/// Object-safe version of [`ImageProvider`] with boxed futures.
pub trait ImageProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<EncodedImage, LlmError>> + Send + 'a>>;
}

impl<T: ImageProvider> ImageProviderDyn for T {
    fn name(&self) -> &str {
        ImageProvider::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<EncodedImage, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased image provider.
pub struct BoxImageProvider {
    inner: Box<dyn ImageProviderDyn + Send + Sync>,
}

impl BoxImageProvider {
    /// Wrap a concrete `ImageProvider` in a type-erased box.
    pub fn new<T: ImageProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Generate a single image.
    pub async fn generate(&self, request: &ImageRequest) -> Result<EncodedImage, LlmError> {
        self.inner.generate_boxed(request).await
    }
}
