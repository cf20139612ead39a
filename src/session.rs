use crate::{
    backend::GenerativeBackend,
    error::OperationError,
    models::{GenerationRequest, GenerationResult},
    orchestrator::SocialPostGenerator,
};

/// One user's generation: the request as submitted and the latest result.
///
/// Regenerating replaces one half of the result and leaves the request and
/// the other half alone. Feedback is used for that one call and forgotten.
#[derive(Debug, Clone)]
pub struct PostSession {
    request: GenerationRequest,
    result: Option<GenerationResult>,
}

impl PostSession {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            result: None,
        }
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    /// Generates posts and images. Any previous result is discarded first,
    /// so a failure leaves the session without a result.
    pub async fn generate<B: GenerativeBackend + ?Sized>(
        &mut self,
        generator: &SocialPostGenerator<B>,
    ) -> Result<&GenerationResult, OperationError> {
        self.result = None;
        let result = generator.generate_social_post(&self.request).await?;
        Ok(self.result.insert(result))
    }

    /// Returns whether a result was updated; with no result yet there is
    /// nothing to attach new posts to.
    pub async fn regenerate_posts<B: GenerativeBackend + ?Sized>(
        &mut self,
        generator: &SocialPostGenerator<B>,
        feedback: &str,
    ) -> Result<bool, OperationError> {
        let posts = generator.generate_posts(&self.request, Some(feedback)).await?;
        match self.result.as_mut() {
            Some(result) => {
                result.posts = posts;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn regenerate_images<B: GenerativeBackend + ?Sized>(
        &mut self,
        generator: &SocialPostGenerator<B>,
        feedback: &str,
    ) -> Result<bool, OperationError> {
        let images = generator.generate_images(&self.request, Some(feedback)).await?;
        match self.result.as_mut() {
            Some(result) => {
                result.images = images;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
