//! Provider abstractions for chat and image generation backends.

pub mod box_provider;
pub mod provider;

pub use box_provider::{BoxChatProvider, BoxImageProvider};
pub use provider::{ChatProvider, ImageProvider};
