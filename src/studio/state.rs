use crate::{
    encoder,
    error::{Result, StudioError},
    gemini::{generate_batch, ImageGenerator},
    models::{GenerationRequest, ReferenceUpload, MAX_IMAGE_COUNT, MIN_IMAGE_COUNT},
};
use std::sync::Arc;

pub const DEFAULT_BRAND_NAME: &str = "Elegance";

/// Everything one browser session sees on the page.
#[derive(Debug, Clone)]
pub struct StudioState {
    pub brand_name: String,
    pub image_count: i32,
    pub reference: Option<ReferenceUpload>,
    pub results: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Work captured by `begin_generation`, run outside the state lock.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub upload: ReferenceUpload,
    pub brand_name: String,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    Loading { placeholders: usize },
    Failed { message: String },
    Ready(Vec<String>),
    Awaiting,
}

impl Default for StudioState {
    fn default() -> Self {
        Self {
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            image_count: MIN_IMAGE_COUNT,
            reference: None,
            results: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

impl StudioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_reference(&mut self, upload: ReferenceUpload) {
        log::info!(
            "Reference image selected: {} ({} bytes)",
            upload.file_name.as_deref().unwrap_or("unnamed"),
            upload.bytes.len()
        );
        self.reference = Some(upload);
        if !self.is_loading {
            self.error = None;
        }
    }

    pub fn set_brand_name(&mut self, brand_name: impl Into<String>) {
        self.brand_name = brand_name.into();
    }

    pub fn set_image_count(&mut self, count: i32) {
        self.image_count = count.clamp(MIN_IMAGE_COUNT, MAX_IMAGE_COUNT);
    }

    /// Shows a message without starting anything. Ignored while loading.
    pub fn report(&mut self, err: &StudioError) {
        if !self.is_loading {
            self.error = Some(err.user_message());
        }
    }

    pub fn preview_path(&self) -> Option<String> {
        self.reference
            .as_ref()
            .map(|r| format!("/reference/preview?v={}", r.id))
    }

    /// Guards and flips the state into loading. `None` means nothing to run.
    pub fn begin_generation(&mut self) -> Option<PendingGeneration> {
        if self.is_loading {
            log::warn!("Generation already in progress, ignoring request");
            return None;
        }

        let upload = match &self.reference {
            Some(upload) => upload.clone(),
            None => {
                self.error = Some(StudioError::MissingReferenceImage.user_message());
                return None;
            }
        };

        self.is_loading = true;
        self.error = None;
        self.results.clear();

        Some(PendingGeneration {
            upload,
            brand_name: self.brand_name.clone(),
            count: self.image_count,
        })
    }

    /// Settles a generation. Always clears the loading flag.
    pub fn finish_generation(&mut self, outcome: Result<Vec<String>>) {
        self.is_loading = false;
        match outcome {
            Ok(images) => {
                log::info!("Generated {} image(s)", images.len());
                self.results = images;
                self.error = None;
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.results.clear();
                self.error = Some(e.user_message());
            }
        }
    }

    pub async fn generate(&mut self, generator: Arc<dyn ImageGenerator>) {
        if let Some(pending) = self.begin_generation() {
            pending
                .run_then(generator, |outcome| self.finish_generation(outcome))
                .await;
        }
    }

    pub fn gallery(&self) -> GalleryView {
        if self.is_loading {
            GalleryView::Loading {
                placeholders: self.image_count.max(0) as usize,
            }
        } else if let Some(message) = self.error.as_ref().filter(|m| !m.is_empty()) {
            GalleryView::Failed {
                message: message.clone(),
            }
        } else if !self.results.is_empty() {
            GalleryView::Ready(self.results.clone())
        } else {
            GalleryView::Awaiting
        }
    }
}

impl PendingGeneration {
    pub async fn run(self, generator: Arc<dyn ImageGenerator>) -> Result<Vec<String>> {
        let encoded = encoder::encode(&self.upload)?;
        let request = GenerationRequest::new(encoded, &self.brand_name, self.count);
        generate_batch(generator, &request).await
    }

    /// Runs the batch and hands the outcome to `finish`. If this future is
    /// dropped or unwinds first, `finish` still gets an interrupted error.
    pub async fn run_then<F>(self, generator: Arc<dyn ImageGenerator>, finish: F)
    where
        F: FnOnce(Result<Vec<String>>),
    {
        let guard = SettleGuard { finish: Some(finish) };
        let outcome = self.run(generator).await;
        guard.settle(outcome);
    }
}

struct SettleGuard<F: FnOnce(Result<Vec<String>>)> {
    finish: Option<F>,
}

impl<F: FnOnce(Result<Vec<String>>)> SettleGuard<F> {
    fn settle(mut self, outcome: Result<Vec<String>>) {
        if let Some(finish) = self.finish.take() {
            finish(outcome);
        }
    }
}

impl<F: FnOnce(Result<Vec<String>>)> Drop for SettleGuard<F> {
    fn drop(&mut self) {
        if let Some(finish) = self.finish.take() {
            log::warn!("Generation dropped before it settled");
            finish(Err(StudioError::Generation("generation was interrupted".into())));
        }
    }
}
