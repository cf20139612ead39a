use super::Transport;
use crate::{
    error::Result,
    models::{gemini::GenerateContentResponse, StructuredTextRequest, TextGenerationRequest},
};
use serde_json::{json, Value};

#[derive(Clone)]
pub struct TextClient {
    transport: Transport,
    default_model: String,
}

impl TextClient {
    pub fn new(transport: Transport, default_model: impl Into<String>) -> Self {
        Self {
            transport,
            default_model: default_model.into(),
        }
    }

    pub async fn generate(&self, request: TextGenerationRequest) -> Result<String> {
        let model_id = request.model_id.as_deref().unwrap_or(&self.default_model);
        let payload = build_text_payload(&request.prompt);

        log::info!("Invoking model: {}", model_id);

        let response: GenerateContentResponse = self
            .transport
            .post(model_id, "generateContent", &payload)
            .await?;
        Ok(response.text())
    }

    pub async fn generate_structured(&self, request: StructuredTextRequest) -> Result<String> {
        let model_id = request.model_id.as_deref().unwrap_or(&self.default_model);
        let payload = build_structured_payload(&request.prompt, &request.item_description);

        log::info!("Invoking model with string-array schema: {}", model_id);

        let response: GenerateContentResponse = self
            .transport
            .post(model_id, "generateContent", &payload)
            .await?;
        Ok(response.text())
    }
}

pub fn build_text_payload(prompt: &str) -> Value {
    json!({
        "contents": [
            { "parts": [ { "text": prompt } ] }
        ]
    })
}

pub fn build_structured_payload(prompt: &str, item_description: &str) -> Value {
    json!({
        "contents": [
            { "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "STRING",
                    "description": item_description
                }
            }
        }
    })
}
