//! The five generators of the Robokit pipeline.
//!
//! Each generator is one stable entry point (input struct in, output struct
//! out) with its prompt text and model choice as private implementation
//! detail. All chat-backed generators constrain the model with a
//! schemars-derived JSON schema via structured output and parse the response
//! strictly into a typed payload.
//!
//! Generators return `Result<T, GenerateError>` and never decide
//! recoverability themselves -- the orchestrator in
//! [`crate::pipeline`] owns the recovery policy.

pub mod bom;
pub mod code;
pub mod description;
pub mod image;
pub mod instructions;
pub mod model3d;

use robokit_types::error::GenerateError;
use robokit_types::llm::{
    CompletionRequest, Message, OutputConfig, OutputFormat, OutputJsonSchema,
};
use robokit_types::payload::strict_schema_for;

use crate::llm::BoxChatProvider;

/// Default completion budget for generator calls.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Build an [`OutputConfig`] constraining the response to the payload schema.
fn output_config<T: schemars::JsonSchema>(name: &str) -> OutputConfig {
    OutputConfig {
        format: OutputFormat {
            type_field: "json_schema".to_string(),
            json_schema: OutputJsonSchema {
                name: name.to_string(),
                schema: strict_schema_for::<T>(),
                strict: Some(true),
            },
        },
    }
}

/// Call the chat provider with a structured-output constraint and parse the
/// response content as `T`.
///
/// An empty content body maps to [`GenerateError::MissingContent`]; a body
/// that does not deserialize maps to [`GenerateError::MalformedResponse`].
async fn call_structured<T>(
    provider: &BoxChatProvider,
    model: &str,
    schema_name: &str,
    system_prompt: String,
    user_message: Message,
) -> Result<T, GenerateError>
where
    T: serde::de::DeserializeOwned + schemars::JsonSchema,
{
    let request = CompletionRequest {
        model: model.to_string(),
        messages: vec![user_message],
        system: Some(system_prompt),
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: Some(0.7),
        output_config: Some(output_config::<T>(schema_name)),
    };

    let response = provider.complete(&request).await?;

    if response.content.trim().is_empty() {
        return Err(GenerateError::MissingContent);
    }

    serde_json::from_str::<T>(&response.content).map_err(|e| {
        GenerateError::MalformedResponse(format!(
            "failed to parse {schema_name}: {e}\nraw content: {}",
            response.content
        ))
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Scripted mock providers shared by the generator tests.

    use std::sync::{Arc, Mutex};

    use robokit_types::image::EncodedImage;
    use robokit_types::llm::{
        CompletionRequest, CompletionResponse, ImageRequest, LlmError, StopReason, Usage,
    };

    use crate::llm::provider::{ChatProvider, ImageProvider};

    /// Chat provider that pops one scripted reply per call and records the
    /// requests it saw.
    pub struct MockChatProvider {
        replies: Mutex<Vec<Result<String, LlmError>>>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl MockChatProvider {
        /// One static successful reply, repeated for every call.
        pub fn with_response(content: &str) -> Self {
            Self::with_script(vec![Ok(content.to_string())])
        }

        /// Scripted replies, consumed front to back; the last is repeated.
        pub fn with_script(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Handle to the recorded requests, usable after the provider is
        /// boxed away.
        pub fn request_log(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
            Arc::clone(&self.requests)
        }

        pub fn failing(message: &str) -> Self {
            Self::with_script(vec![Err(LlmError::Provider {
                message: message.to_string(),
            })])
        }
    }

    impl ChatProvider for MockChatProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.remove(0)
            } else {
                clone_reply(&replies[0])
            };
            reply.map(|content| CompletionResponse {
                id: "msg_mock_123".to_string(),
                content,
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
            })
        }
    }

    fn clone_reply(reply: &Result<String, LlmError>) -> Result<String, LlmError> {
        match reply {
            Ok(s) => Ok(s.clone()),
            Err(e) => Err(LlmError::Provider {
                message: e.to_string(),
            }),
        }
    }

    /// Image provider that pops one scripted result per call and counts
    /// attempts per model.
    pub struct MockImageProvider {
        replies: Mutex<Vec<Result<EncodedImage, LlmError>>>,
        requests: Arc<Mutex<Vec<ImageRequest>>>,
    }

    impl MockImageProvider {
        pub fn with_script(replies: Vec<Result<EncodedImage, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn always_failing() -> Self {
            Self::with_script(Vec::new())
        }

        /// Handle to the recorded requests, usable after the provider is
        /// boxed away.
        pub fn request_log(&self) -> Arc<Mutex<Vec<ImageRequest>>> {
            Arc::clone(&self.requests)
        }
    }

    impl ImageProvider for MockImageProvider {
        fn name(&self) -> &str {
            "mock_images"
        }

        async fn generate(&self, request: &ImageRequest) -> Result<EncodedImage, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(LlmError::Provider {
                    message: "image backend down".to_string(),
                });
            }
            replies.remove(0)
        }
    }
}
