use thiserror::Error;

#[derive(Error, Debug)]
pub enum BananaGenError {
    #[error("API key is required; pass one explicitly or set a supported environment variable")]
    MissingApiKey,
    #[error("Prompt must be a non-empty string")]
    EmptyPrompt,
    #[error("Failed to resolve reference image {url}: {message}")]
    ReferenceImage { url: String, message: String },
    #[error("Task creation failed: {0}")]
    TaskCreation(String),
    #[error("Authentication failed (status {status})")]
    Authentication { status: reqwest::StatusCode },
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Generation refused: {0}")]
    GenerationRefused(String),
    #[error("Could not extract an asset from the result payload: {0}")]
    ResultExtraction(String),
    #[error("Task did not reach a terminal state within the polling budget")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("API error (status {status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}
