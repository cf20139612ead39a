pub mod image_client;
pub mod text_client;

use crate::{
    backend::GenerativeBackend,
    config::GeminiConfig,
    error::{GenerationError, Result},
    models::{
        gemini::ApiErrorEnvelope, ImageGenerationRequest, InlineImage, ReferenceImageRequest,
        StructuredTextRequest, TextGenerationRequest,
    },
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use image_client::ImageClient;
pub use text_client::TextClient;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Authenticated HTTP access to the Gemini model endpoints, shared by the
/// text and image clients.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Transport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| GenerationError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self, model_id: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model_id, method)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        model_id: &str,
        method: &str,
        payload: &Value,
    ) -> Result<T> {
        let url = self.endpoint(model_id, method);

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {:?}", model_id, e);
                GenerationError::BackendFailure(format!("request failed: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await?;
        log::debug!("{} {} -> {} ({} bytes)", model_id, method, status, body.len());

        if !status.is_success() {
            return Err(GenerationError::BackendFailure(error_message(status, &body)));
        }

        serde_json::from_str(&body).map_err(|e| {
            GenerationError::BackendFailure(format!("undecodable {} response: {}", method, e))
        })
    }
}

/// Describes a non-success response, preferring the service's own message.
pub fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => format!(
            "Gemini service error: {} - {}",
            envelope
                .error
                .status
                .unwrap_or_else(|| status.as_u16().to_string()),
            envelope.error.message.unwrap_or_else(|| "no message".into())
        ),
        Err(_) => format!("HTTP {}", status),
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl GeminiClient {
    /// Fails with a configuration error when no api key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;

        log::info!(
            "Gemini client ready (endpoint: {}, key: {})",
            config.base_url(),
            config.masked_api_key()
        );

        Ok(Self {
            text_client: TextClient::new(transport.clone(), config.text_model()),
            image_client: ImageClient::new(
                transport,
                config.image_model(),
                config.reference_image_model(),
            ),
        })
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_text(&self, request: TextGenerationRequest) -> Result<String> {
        self.text_client.generate(request).await
    }

    async fn generate_structured(&self, request: StructuredTextRequest) -> Result<String> {
        self.text_client.generate_structured(request).await
    }

    async fn generate_images(&self, request: ImageGenerationRequest) -> Result<Vec<InlineImage>> {
        self.image_client.generate(request).await
    }

    async fn generate_from_reference(
        &self,
        request: ReferenceImageRequest,
    ) -> Result<Option<InlineImage>> {
        self.image_client.generate_from_reference(request).await
    }
}
