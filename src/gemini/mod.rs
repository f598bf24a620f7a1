pub mod batch;
pub mod image_client;
pub mod traits;

use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    models::GenerationRequest,
};
use reqwest::Client;
use std::sync::Arc;

pub use batch::generate_batch;
pub use image_client::ImageClient;
pub use traits::ImageGenerator;

/// Process-wide handle on the Gemini API, built once at startup.
#[derive(Clone)]
pub struct GeminiClient {
    image_client: Arc<ImageClient>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("mannequin-muse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StudioError::Config(format!("cannot build HTTP client: {}", e)))?;

        log::info!("Gemini client ready (model: {})", config.model);

        Ok(Self {
            image_client: Arc::new(ImageClient::new(http, config)),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn generator(&self) -> Arc<dyn ImageGenerator> {
        self.image_client.clone()
    }

    pub async fn generate_batch(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        generate_batch(self.generator(), request).await
    }
}
