use crate::{
    error::Result,
    models::{
        ImageGenerationRequest, InlineImage, ReferenceImageRequest, StructuredTextRequest,
        TextGenerationRequest,
    },
};
use async_trait::async_trait;

/// The generative service the orchestrator talks to.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Plain text completion. An empty string means the model produced no text.
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String>;

    /// Completion constrained to a JSON array of strings. Returns the raw
    /// JSON text, undecoded.
    async fn generate_structured(&self, request: StructuredTextRequest) -> Result<String>;

    /// Text-to-image synthesis.
    async fn generate_images(&self, request: ImageGenerationRequest) -> Result<Vec<InlineImage>>;

    /// Image synthesis from a source image and an instruction, image output
    /// only. `None` when the response carried no image.
    async fn generate_from_reference(
        &self,
        request: ReferenceImageRequest,
    ) -> Result<Option<InlineImage>>;
}
