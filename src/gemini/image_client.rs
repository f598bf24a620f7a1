use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    gemini::traits::ImageGenerator,
    models::{
        data_uri, ApiErrorResponse, EncodedImage, GenerateContentRequest, GenerateContentResponse,
        GenerationConfig, InlineData, Modality, RequestContent, RequestPart,
    },
};
use async_trait::async_trait;
use reqwest::Client;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    config: GeminiConfig,
}

impl ImageClient {
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    pub fn build_prompt(brand_name: &str) -> String {
        format!(
            "Generate a high-quality professional studio photo of a female golden mannequin wearing the exact same outfit from the reference image.
Replicate every element of the clothing with absolute fidelity: fabric texture, lace/embroidery patterns, colors, transparency, stitching, structure, and fit.
Do not change, simplify, stylize, or reinterpret any part of the design.

Mannequin: golden, elegant, curvy, smooth reflective surface, realistic proportions.
No variation in body shape or pose. Front view, close-to-mid full body framing filling ~85% of the frame.

Lighting: cinematic soft key with subtle warm back rim to separate the mannequin; the outfit is the brightest focal point.

Background (fixed like the sample): a luxury fashion studio with silk curtains, pastel floral arrangements, and perfume bottles on golden side tables.
Add a softly glowing neon sign that reads \"{}\" behind or slightly beside the mannequin, integrated naturally and not overpowering the subject.

Output: generate 1 consistent, ultra-realistic editorial photo that matches this style exactly.",
            brand_name
        )
    }

    pub fn build_request(reference: &EncodedImage, brand_name: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: reference.mime_type.clone(),
                            data: reference.data.clone(),
                        },
                    },
                    RequestPart::Text {
                        text: Self::build_prompt(brand_name),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Image],
            },
        }
    }

    pub async fn generate(&self, reference: &EncodedImage, brand_name: &str) -> Result<String> {
        let request = Self::build_request(reference, brand_name);
        let url = self.config.generate_content_url();

        log::info!("Generating mannequin image with model: {}", self.config.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini request failed: {:?}", e);
                StudioError::Generation(format!("request to {} failed: {}", self.config.model, e))
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| {
                    let status_name = e.error.status.unwrap_or_default();
                    e.error.message.map(|m| format!("{} {}", status_name, m))
                })
                .unwrap_or_else(|| body.chars().take(200).collect());
            log::error!("Gemini returned HTTP {}: {}", status, detail);
            return Err(StudioError::Generation(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail.trim()
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            log::error!("Undecodable Gemini response: {}", e);
            StudioError::Generation(format!("invalid response body: {}", e))
        })?;

        extract_image(&parsed)
    }
}

/// First inline image of the first candidate, as a data URI.
pub fn extract_image(response: &GenerateContentResponse) -> Result<String> {
    if let Some(image) = response.first_image() {
        return Ok(data_uri(&image.mime_type, &image.data));
    }

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        log::warn!("Prompt was blocked: {}", reason);
        return Err(StudioError::Generation(format!("prompt blocked: {}", reason)));
    }

    let text = response.text();
    if !text.is_empty() {
        log::warn!("Model answered with text instead of an image: {}", text);
    }
    let finish = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .unwrap_or("none");

    Err(StudioError::Generation(format!(
        "No image data found in the API response (finish reason: {})",
        finish
    )))
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate_one(&self, reference: &EncodedImage, brand_name: &str) -> Result<String> {
        self.generate(reference, brand_name).await
    }
}
