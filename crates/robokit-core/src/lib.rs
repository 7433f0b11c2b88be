//! Generator pipeline for Robokit.
//!
//! This crate defines the "ports" (provider traits) that the infrastructure
//! layer implements, the five generators that shape prompts and parse
//! schema-constrained responses, the orchestrator that sequences them, and
//! the archive packager. It depends only on `robokit-types` -- never on
//! `robokit-infra` or any HTTP crate.

pub mod generate;
pub mod llm;
pub mod package;
pub mod pipeline;
