use crate::error::{GenerationError, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_REFERENCE_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub reference_image_model: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: None,
            text_model: None,
            image_model: None,
            reference_image_model: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("API_KEY")
            .ok()
            .or_else(|| env::var("GEMINI_API_KEY").ok());
        let base_url = env::var("GEMINI_BASE_URL").ok();
        let text_model = env::var("GEMINI_TEXT_MODEL").ok();
        let image_model = env::var("GEMINI_IMAGE_MODEL").ok();
        let reference_image_model = env::var("GEMINI_REFERENCE_IMAGE_MODEL").ok();

        GeminiConfig {
            api_key,
            base_url,
            text_model,
            image_model,
            reference_image_model,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = Some(model.into());
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    pub fn with_reference_image_model(mut self, model: impl Into<String>) -> Self {
        self.reference_image_model = Some(model.into());
        self
    }

    /// The api key, or a configuration error when it is unset or blank.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(GenerationError::ConfigError(
                "API_KEY environment variable not set".into(),
            )),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn text_model(&self) -> &str {
        self.text_model.as_deref().unwrap_or(DEFAULT_TEXT_MODEL)
    }

    pub fn image_model(&self) -> &str {
        self.image_model.as_deref().unwrap_or(DEFAULT_IMAGE_MODEL)
    }

    pub fn reference_image_model(&self) -> &str {
        self.reference_image_model
            .as_deref()
            .unwrap_or(DEFAULT_REFERENCE_IMAGE_MODEL)
    }

    /// First few characters of the key, safe to put in logs.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) if key.chars().count() > 4 => {
                format!("{}...", key.chars().take(4).collect::<String>())
            }
            Some(_) => "***".to_string(),
            None => "<unset>".to_string(),
        }
    }
}
