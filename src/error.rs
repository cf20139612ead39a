use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidRequest,
    InvalidReferenceImage,
    PromptGenerationFailed,
    InsufficientResults,
    EmptyImagePayload,
    MalformedResponse,
    BackendFailure,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid reference image: {0}")]
    InvalidReferenceImage(String),
    #[error("Failed to generate an image prompt")]
    PromptGenerationFailed,
    #[error("Expected {expected} images, backend returned {actual}")]
    InsufficientResults { expected: usize, actual: usize },
    #[error("An image was generated without data")]
    EmptyImagePayload,
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Backend failure: {0}")]
    BackendFailure(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::ConfigError(_) => ErrorKind::Configuration,
            GenerationError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            GenerationError::InvalidReferenceImage(_) => ErrorKind::InvalidReferenceImage,
            GenerationError::PromptGenerationFailed => ErrorKind::PromptGenerationFailed,
            GenerationError::InsufficientResults { .. } => ErrorKind::InsufficientResults,
            GenerationError::EmptyImagePayload => ErrorKind::EmptyImagePayload,
            GenerationError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            GenerationError::BackendFailure(_) => ErrorKind::BackendFailure,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::BackendFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// The caller-facing operations of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Posts,
    Images,
    SocialPost,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Posts => write!(f, "posts"),
            Operation::Images => write!(f, "images"),
            Operation::SocialPost => write!(f, "social post"),
        }
    }
}

/// Coarse, user-readable failure of one generator operation.
///
/// The detailed cause is logged where the failure is caught and is not kept
/// here; only its [`ErrorKind`] survives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationError {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    pub fn new(operation: Operation, kind: ErrorKind) -> Self {
        let message = match (operation, kind) {
            (_, ErrorKind::InvalidRequest) => {
                format!("Original content is missing. Cannot generate {}.", operation)
            }
            (Operation::Posts, ErrorKind::MalformedResponse) => {
                "Failed to parse the generated post variations. The format was unexpected."
                    .to_string()
            }
            (Operation::Posts, _) => "Failed to generate posts. Please try again.".to_string(),
            (Operation::Images, _) => "Failed to generate images. Please try again.".to_string(),
            (Operation::SocialPost, _) => {
                "Failed to generate social post. Please try again later.".to_string()
            }
        };

        Self {
            operation,
            kind,
            message,
        }
    }

    /// Logs the underlying cause and collapses it into an operation failure.
    pub fn wrap(operation: Operation, err: GenerationError) -> Self {
        log::error!("Error generating {}: {}", operation, err);
        Self::new(operation, err.kind())
    }
}
