//! OpenAI-compatible chat provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves any API that speaks the
//! OpenAI chat completions protocol via a configurable base URL.
//!
//! Uses [`async_openai`] for type-safe request/response handling. Multimodal
//! messages (a sketch image attached to a user message) are sent as a
//! content-part array with the image inlined as a data URL, and structured
//! output travels as a `json_schema` response format.

pub mod config;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequest, FinishReason, ImageUrl, ResponseFormat,
    ResponseFormatJsonSchema,
};
use async_openai::Client;
use tracing::Instrument;

use robokit_core::llm::ChatProvider;
use robokit_observe::genai_attrs;
use robokit_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Unified chat provider for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
        }
    }

    /// Create an OpenAI provider against `https://api.openai.com/v1`.
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        // System message
        if let Some(ref system) = request.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.clone()),
                    name: None,
                },
            ));
        }

        // Conversation messages
        for msg in &request.messages {
            let oai_msg = match msg.role {
                MessageRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    },
                ),
                MessageRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage {
                        content: user_content(msg),
                        name: None,
                    },
                ),
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                                msg.content.clone(),
                            )),
                            refusal: None,
                            name: None,
                            audio: None,
                            tool_calls: None,
                            function_call: None,
                        },
                    )
                }
            };
            messages.push(oai_msg);
        }

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let mut req = CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        };

        // Structured output constraint
        if let Some(ref output) = request.output_config {
            req.response_format = Some(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: output.format.json_schema.name.clone(),
                    schema: Some(output.format.json_schema.schema.clone()),
                    strict: output.format.json_schema.strict,
                },
            });
        }

        Ok(req)
    }
}

/// User message content: a plain text string, or a text + data-URL image
/// content-part array when a sketch is attached.
fn user_content(msg: &Message) -> ChatCompletionRequestUserMessageContent {
    match &msg.image {
        Some(image) => ChatCompletionRequestUserMessageContent::Array(vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: msg.content.clone(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image.to_data_url(),
                        detail: None,
                    },
                },
            ),
        ]),
        None => ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
    }
}

// OpenAiCompatibleProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state including the API key inside the
// async-openai Client.

impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request)?;

        let span = tracing::info_span!(
            "chat",
            { genai_attrs::GEN_AI_OPERATION_NAME } = genai_attrs::OP_CHAT,
            { genai_attrs::GEN_AI_PROVIDER_NAME } = self.provider_name.as_str(),
            { genai_attrs::GEN_AI_REQUEST_MODEL } = oai_request.model.as_str(),
            { genai_attrs::GEN_AI_REQUEST_MAX_TOKENS } = request.max_tokens,
            { genai_attrs::GEN_AI_USAGE_INPUT_TOKENS } = tracing::field::Empty,
            { genai_attrs::GEN_AI_USAGE_OUTPUT_TOKENS } = tracing::field::Empty,
            { genai_attrs::GEN_AI_RESPONSE_ID } = tracing::field::Empty,
        );

        let response = self
            .client
            .chat()
            .create(oai_request)
            .instrument(span.clone())
            .await
            .map_err(map_openai_error)?;

        if let Some(ref usage) = response.usage {
            span.record(genai_attrs::GEN_AI_USAGE_INPUT_TOKENS, usage.prompt_tokens);
            span.record(genai_attrs::GEN_AI_USAGE_OUTPUT_TOKENS, usage.completion_tokens);
        }
        span.record(genai_attrs::GEN_AI_RESPONSE_ID, response.id.as_str());

        // Extract content from the first choice
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        // Map finish reason
        let stop_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Stop => StopReason::EndTurn,
                FinishReason::Length => StopReason::MaxTokens,
                FinishReason::ContentFilter => StopReason::ContentFilter,
                FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::EndTurn,
            })
            .unwrap_or(StopReason::EndTurn);

        // Extract usage
        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
pub(crate) fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => LlmError::AuthenticationFailed,
                    429 => LlmError::RateLimited {
                        retry_after_ms: None,
                    },
                    529 => LlmError::Overloaded(err.to_string()),
                    _ => LlmError::Provider {
                        message: err.to_string(),
                    },
                }
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use robokit_types::image::EncodedImage;
    use robokit_types::llm::{OutputConfig, OutputFormat, OutputJsonSchema};

    use super::*;

    fn text_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::user("Hello")],
            system: Some("Be helpful".to_string()),
            max_tokens: 1024,
            temperature: Some(0.7),
            output_config: None,
        }
    }

    #[test]
    fn test_openai_factory() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model, "gpt-4o-mini");
    }

    #[test]
    fn test_build_request_messages() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let oai_req = provider.build_request(&text_request()).unwrap();
        assert_eq!(oai_req.model, "gpt-4o-mini");
        // 1 system + 1 user
        assert_eq!(oai_req.messages.len(), 2);
        assert_eq!(oai_req.max_completion_tokens, Some(1024));
        assert!(oai_req.response_format.is_none());
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let mut request = text_request();
        request.model = String::new();

        let oai_req = provider.build_request(&request).unwrap();
        assert_eq!(oai_req.model, "gpt-4o-mini");
    }

    #[test]
    fn test_build_request_attached_image_becomes_content_array() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o");
        let mut request = text_request();
        request.messages = vec![Message::user_with_image(
            "Here is my sketch",
            EncodedImage::png("aGVsbG8="),
        )];

        let oai_req = provider.build_request(&request).unwrap();
        let ChatCompletionRequestMessage::User(user) = &oai_req.messages[1] else {
            panic!("expected user message");
        };
        let ChatCompletionRequestUserMessageContent::Array(parts) = &user.content else {
            panic!("expected content-part array");
        };
        assert_eq!(parts.len(), 2);
        let ChatCompletionRequestUserMessageContentPart::ImageUrl(image_part) = &parts[1] else {
            panic!("expected image part");
        };
        assert!(image_part.image_url.url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_build_request_output_config_sets_response_format() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o-mini");
        let mut request = text_request();
        request.output_config = Some(OutputConfig {
            format: OutputFormat {
                type_field: "json_schema".to_string(),
                json_schema: OutputJsonSchema {
                    name: "BomPayload".to_string(),
                    schema: serde_json::json!({"type": "object"}),
                    strict: Some(true),
                },
            },
        });

        let oai_req = provider.build_request(&request).unwrap();
        let Some(ResponseFormat::JsonSchema { json_schema }) = oai_req.response_format else {
            panic!("expected json_schema response format");
        };
        assert_eq!(json_schema.name, "BomPayload");
        assert_eq!(json_schema.strict, Some(true));
    }

    #[test]
    fn test_map_openai_error_api_auth() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Incorrect API key provided".to_string(),
            r#type: Some("authentication_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_openai_error_rate_limit() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "Rate limit exceeded".to_string(),
            r#type: Some("rate_limit_error".to_string()),
            param: None,
            code: None,
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[test]
    fn test_map_openai_error_invalid_argument() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
