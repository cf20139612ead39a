//! In-memory backend for orchestrator and session tests.

use crate::{
    backend::GenerativeBackend,
    error::{GenerationError, Result},
    models::{
        ImageGenerationRequest, InlineImage, ReferenceImageRequest, StructuredTextRequest,
        TextGenerationRequest,
    },
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// Replays queued responses per capability and records every request.
/// A capability with nothing queued fails with a backend error.
#[derive(Default)]
pub struct ScriptedBackend {
    text: Mutex<VecDeque<Result<String>>>,
    structured: Mutex<VecDeque<Result<String>>>,
    images: Mutex<VecDeque<Result<Vec<InlineImage>>>>,
    reference: Mutex<VecDeque<Result<Option<InlineImage>>>>,
    text_requests: Mutex<Vec<TextGenerationRequest>>,
    structured_requests: Mutex<Vec<StructuredTextRequest>>,
    image_requests: Mutex<Vec<ImageGenerationRequest>>,
    reference_requests: Mutex<Vec<ReferenceImageRequest>>,
    reference_barrier: Option<Arc<Barrier>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, response: Result<String>) -> Self {
        self.text.lock().unwrap().push_back(response);
        self
    }

    pub fn with_structured(self, response: Result<String>) -> Self {
        self.structured.lock().unwrap().push_back(response);
        self
    }

    pub fn with_images(self, response: Result<Vec<InlineImage>>) -> Self {
        self.images.lock().unwrap().push_back(response);
        self
    }

    pub fn with_reference(self, response: Result<Option<InlineImage>>) -> Self {
        self.reference.lock().unwrap().push_back(response);
        self
    }

    /// Makes every reference call wait until `parties` of them are in flight.
    pub fn with_reference_barrier(mut self, parties: usize) -> Self {
        self.reference_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn text_requests(&self) -> Vec<TextGenerationRequest> {
        self.text_requests.lock().unwrap().clone()
    }

    pub fn structured_requests(&self) -> Vec<StructuredTextRequest> {
        self.structured_requests.lock().unwrap().clone()
    }

    pub fn image_requests(&self) -> Vec<ImageGenerationRequest> {
        self.image_requests.lock().unwrap().clone()
    }

    pub fn reference_requests(&self) -> Vec<ReferenceImageRequest> {
        self.reference_requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.text_requests.lock().unwrap().len()
            + self.structured_requests.lock().unwrap().len()
            + self.image_requests.lock().unwrap().len()
            + self.reference_requests.lock().unwrap().len()
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T>>>, what: &str) -> Result<T> {
    queue.lock().unwrap().pop_front().unwrap_or_else(|| {
        Err(GenerationError::BackendFailure(format!(
            "no scripted {} response",
            what
        )))
    })
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String> {
        self.text_requests.lock().unwrap().push(request);
        next(&self.text, "text")
    }

    async fn generate_structured(&self, request: StructuredTextRequest) -> Result<String> {
        self.structured_requests.lock().unwrap().push(request);
        next(&self.structured, "structured")
    }

    async fn generate_images(&self, request: ImageGenerationRequest) -> Result<Vec<InlineImage>> {
        self.image_requests.lock().unwrap().push(request);
        next(&self.images, "image")
    }

    async fn generate_from_reference(
        &self,
        request: ReferenceImageRequest,
    ) -> Result<Option<InlineImage>> {
        self.reference_requests.lock().unwrap().push(request);
        if let Some(barrier) = &self.reference_barrier {
            barrier.wait().await;
        }
        next(&self.reference, "reference image")
    }
}

pub fn posts_json(posts: &[&str]) -> String {
    serde_json::to_string(posts).unwrap()
}

pub fn jpeg(data: &str) -> InlineImage {
    InlineImage::new("image/jpeg", data)
}
