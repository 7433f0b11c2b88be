//! Error types shared across the Robokit pipeline.

use crate::llm::LlmError;

/// Error from a single generator call.
///
/// Generators never decide recoverability themselves; they return a typed
/// failure and the orchestrator applies the central recovery policy.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The upstream provider call failed (network, rate limit, model down).
    #[error("provider failure: {0}")]
    Provider(#[from] LlmError),

    /// The call succeeded but the body did not parse as the declared payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call succeeded but carried no usable content.
    #[error("missing content in provider response")]
    MissingContent,
}

/// Error from a full pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A pipeline-fatal generator failed; the whole request is aborted.
    #[error("{generator} generation failed: {source}")]
    Fatal {
        /// Which generator failed (e.g., "code", "instructions").
        generator: &'static str,
        #[source]
        source: GenerateError,
    },
}

/// Error while assembling the downloadable archive.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("archive write failed: {0}")]
    Zip(String),

    #[error("csv serialization failed: {0}")]
    Csv(String),

    #[error("invalid image payload: {0}")]
    InvalidImage(String),
}
