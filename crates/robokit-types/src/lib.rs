//! Shared domain types for Robokit.
//!
//! This crate contains the core domain types used across the Robokit
//! pipeline: project requests, BOM items, generated artifacts, LLM
//! request/response shapes, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, schemars, thiserror.

pub mod error;
pub mod image;
pub mod llm;
pub mod payload;
pub mod project;
