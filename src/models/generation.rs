use super::common::{ImageStyle, Platform, Tone};
use crate::error::{GenerationError, Result};
use serde::{Deserialize, Serialize};

/// Everything the user entered for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub content: String,
    pub platform: Platform,
    pub tone: Tone,
    pub image_style: ImageStyle,
    /// Reference image as a `data:` URI; parsed when images are generated.
    pub reference_image: Option<String>,
}

impl GenerationRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            platform: Platform::Instagram,
            tone: Tone::Casual,
            image_style: ImageStyle::Photorealistic,
            reference_image: None,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_image_style(mut self, style: ImageStyle) -> Self {
        self.image_style = style;
        self
    }

    pub fn with_reference_image(mut self, data_uri: impl Into<String>) -> Self {
        self.reference_image = Some(data_uri.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "content must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub posts: Vec<String>,
    /// `data:<mime>;base64,<payload>` URIs.
    pub images: Vec<String>,
}

/// Trims feedback, treating blank text as no feedback.
pub fn normalize_feedback(feedback: Option<&str>) -> Option<&str> {
    feedback.map(str::trim).filter(|f| !f.is_empty())
}
