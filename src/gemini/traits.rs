use crate::{error::Result, models::EncodedImage};
use async_trait::async_trait;

/// One reference image in, one generated image out (as a data URI).
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_one(&self, reference: &EncodedImage, brand_name: &str) -> Result<String>;
}
