//! REST API route handlers.

pub mod project;
