use super::Transport;
use crate::{
    error::{GenerationError, Result},
    models::{
        gemini::{GenerateContentResponse, PredictResponse},
        ImageGenerationRequest, InlineImage, ReferenceImageRequest,
    },
};
use serde_json::{json, Value};

#[derive(Clone)]
pub struct ImageClient {
    transport: Transport,
    default_model: String,
    default_reference_model: String,
}

impl ImageClient {
    pub fn new(
        transport: Transport,
        default_model: impl Into<String>,
        default_reference_model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            default_model: default_model.into(),
            default_reference_model: default_reference_model.into(),
        }
    }

    pub async fn generate(&self, request: ImageGenerationRequest) -> Result<Vec<InlineImage>> {
        let model_id = request.model_id.as_deref().unwrap_or(&self.default_model);
        let payload = build_predict_payload(&request);

        log::info!(
            "Generating {} image(s) with model: {}",
            request.num_images,
            model_id
        );

        let response: PredictResponse = self.transport.post(model_id, "predict", &payload).await?;

        Ok(images_from_predictions(response, &request.output_mime_type))
    }

    pub async fn generate_from_reference(
        &self,
        request: ReferenceImageRequest,
    ) -> Result<Option<InlineImage>> {
        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or(&self.default_reference_model);
        let payload = build_reference_payload(&request)?;

        log::info!("Generating image from reference with model: {}", model_id);

        let response: GenerateContentResponse = self
            .transport
            .post(model_id, "generateContent", &payload)
            .await?;

        Ok(response.first_inline_data().map(|inline| InlineImage {
            mime_type: inline.mime_type.clone(),
            data: Some(inline.data.clone()).filter(|d| !d.is_empty()),
        }))
    }
}

/// A prediction without a usable mime type takes the requested output type.
pub fn images_from_predictions(response: PredictResponse, output_mime_type: &str) -> Vec<InlineImage> {
    response
        .predictions
        .into_iter()
        .map(|p| InlineImage {
            mime_type: p
                .mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| output_mime_type.to_string()),
            data: p.bytes_base64_encoded.filter(|d| !d.is_empty()),
        })
        .collect()
}

pub fn build_predict_payload(request: &ImageGenerationRequest) -> Value {
    json!({
        "instances": [
            { "prompt": request.prompt }
        ],
        "parameters": {
            "sampleCount": request.num_images,
            "aspectRatio": request.aspect_ratio,
            "outputOptions": {
                "mimeType": request.output_mime_type
            }
        }
    })
}

pub fn build_reference_payload(request: &ReferenceImageRequest) -> Result<Value> {
    let data = request.image.data.as_deref().ok_or_else(|| {
        GenerationError::InvalidReferenceImage("reference image has no data".into())
    })?;

    Ok(json!({
        "contents": [
            {
                "parts": [
                    { "inlineData": { "mimeType": request.image.mime_type, "data": data } },
                    { "text": request.instruction }
                ]
            }
        ],
        "generationConfig": {
            "responseModalities": ["IMAGE"]
        }
    }))
}
