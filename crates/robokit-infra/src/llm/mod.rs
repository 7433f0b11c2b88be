//! Chat provider implementations.

pub mod openai_compat;
