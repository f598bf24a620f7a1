//! Mannequin Muse: upload a reference outfit, pick a brand name and a count,
//! and get back studio photos of the outfit on a golden mannequin generated by
//! the Gemini image model.

pub mod config;
pub mod encoder;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod studio;

pub use config::{Config, GeminiConfig, ServerConfig};
pub use error::{Result, StudioError};
pub use gemini::{generate_batch, GeminiClient, ImageClient, ImageGenerator};
pub use models::{data_uri, EncodedImage, GenerationRequest, ReferenceUpload};
pub use studio::{GalleryView, StudioState};
