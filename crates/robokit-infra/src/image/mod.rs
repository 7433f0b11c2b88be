//! Image provider implementations.

pub mod openai;
