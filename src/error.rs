use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),
    #[error("Please upload a reference image.")]
    MissingReferenceImage,
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Server error: {0}")]
    Server(String),
}

impl StudioError {
    /// Message shown in the gallery. Upstream detail stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            StudioError::MissingReferenceImage => self.to_string(),
            StudioError::Encoding(msg) => format!("Could not read the reference image: {}", msg),
            StudioError::Generation(_) => {
                "Failed to generate image. Please check the server log for details.".to_string()
            }
            StudioError::MissingCredential(_) | StudioError::Config(_) | StudioError::Server(_) => {
                "The studio is not configured correctly. Please contact the operator.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(e: reqwest::Error) -> Self {
        StudioError::Generation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
