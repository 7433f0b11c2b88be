//! Infrastructure implementations for Robokit.
//!
//! Concrete adapters behind the `robokit-core` provider traits (an
//! OpenAI-compatible chat provider and an OpenAI image provider), plus
//! service configuration loading.

pub mod config;
pub mod image;
pub mod llm;
