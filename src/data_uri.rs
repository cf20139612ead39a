//! `data:<mime>;base64,<payload>` URIs, the form images travel in on both
//! sides of the generator.

use crate::error::{GenerationError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;

const SUPPORTED_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
    "image/heic",
    "image/heif",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDataUri {
    pub mime_type: String,
    /// Base64 payload, still encoded.
    pub data: String,
}

impl ImageDataUri {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// Parses and validates a reference image URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("missing data: scheme"))?;

        let (mime_type, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| invalid("missing ;base64, marker"))?;

        if mime_type.is_empty() {
            return Err(invalid("missing mime type"));
        }
        let mime_type = mime_type.to_ascii_lowercase();
        if !is_supported_image_type(&mime_type) {
            return Err(invalid(&format!("unsupported mime type {}", mime_type)));
        }
        if data.is_empty() {
            return Err(invalid("empty payload"));
        }
        STANDARD
            .decode(data)
            .map_err(|e| invalid(&format!("payload is not base64: {}", e)))?;

        Ok(Self::new(mime_type, data))
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))
    }

    /// File extension matching the mime type, for saving to disk.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            "image/heif" => "heif",
            _ => "bin",
        }
    }
}

impl fmt::Display for ImageDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

pub fn is_supported_image_type(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime_type)
}

/// Mime type for an image file name, by extension.
pub fn mime_type_for_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

fn invalid(reason: &str) -> GenerationError {
    GenerationError::InvalidReferenceImage(reason.to_string())
}
