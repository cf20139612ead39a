//! Social post generation on top of a multimodal generative API.
//!
//! [`SocialPostGenerator`] turns a [`GenerationRequest`] into three post
//! variants and three image variants, and regenerates either half with
//! feedback. [`GeminiClient`] is the production backend.

pub mod backend;
pub mod config;
pub mod data_uri;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod session;

#[cfg(test)]
mod testing;

pub use backend::GenerativeBackend;
pub use config::GeminiConfig;
pub use data_uri::ImageDataUri;
pub use error::{ErrorKind, GenerationError, Operation, OperationError, Result};
pub use gemini::{GeminiClient, ImageClient, TextClient};
pub use models::{
    GenerationRequest, GenerationResult, ImageGenerationRequest, ImageStyle, InlineImage, Platform,
    ReferenceImageRequest, StructuredTextRequest, TextGenerationRequest, Tone,
};
pub use orchestrator::{SocialPostGenerator, VARIANT_COUNT};
pub use session::PostSession;
