use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextGenerationRequest {
    pub prompt: String,
    pub model_id: Option<String>,
}

/// Text generation constrained to a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTextRequest {
    pub prompt: String,
    pub model_id: Option<String>,
    /// Description attached to each array item in the response schema.
    pub item_description: String,
}
