use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MIN_IMAGE_COUNT: i32 = 1;
pub const MAX_IMAGE_COUNT: i32 = 4;

/// A file as handed to us by the browser or read from disk, before encoding.
#[derive(Debug, Clone)]
pub struct ReferenceUpload {
    pub id: String,
    pub bytes: Bytes,
    pub declared_type: Option<String>,
    pub file_name: Option<String>,
}

impl ReferenceUpload {
    pub fn new(bytes: impl Into<Bytes>, declared_type: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            bytes: bytes.into(),
            declared_type: declared_type.filter(|t| !t.is_empty()),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Base64 payload plus media type, ready to be sent as inline data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    pub data: String,
    pub mime_type: String,
}

impl EncodedImage {
    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime_type, &self.data)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub reference: Arc<EncodedImage>,
    pub brand_name: Arc<str>,
    pub count: i32,
}

impl GenerationRequest {
    pub fn new(reference: EncodedImage, brand_name: &str, count: i32) -> Self {
        Self {
            reference: Arc::new(reference),
            brand_name: Arc::from(brand_name),
            count,
        }
    }
}

pub fn data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_shape() {
        assert_eq!(data_uri("image/png", "AQID"), "data:image/png;base64,AQID");

        let image = EncodedImage {
            data: "/9j/4AAQ".into(),
            mime_type: "image/jpeg".into(),
        };
        assert_eq!(image.to_data_uri(), "data:image/jpeg;base64,/9j/4AAQ");
    }

    #[test]
    fn test_upload_ignores_empty_declared_type() {
        let upload = ReferenceUpload::new(vec![1u8, 2, 3], Some(String::new()));
        assert!(upload.declared_type.is_none());
        assert_eq!(upload.bytes.len(), 3);
    }
}
