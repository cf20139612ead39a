use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub model_id: Option<String>,
    pub num_images: u32,
    pub output_mime_type: String,
    pub aspect_ratio: String,
}

/// Image synthesis conditioned on a source image plus an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImageRequest {
    pub image: InlineImage,
    pub instruction: String,
    pub model_id: Option<String>,
}

/// An image as the backend exchanges it: mime type plus base64 bytes.
///
/// `data` is `None` when the backend returned an image entry without bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Option<String>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: Some(data.into()),
        }
    }
}
