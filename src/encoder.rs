use crate::{
    error::{Result, StudioError},
    models::{EncodedImage, ReferenceUpload},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode an upload that is already in memory.
pub fn encode(upload: &ReferenceUpload) -> Result<EncodedImage> {
    encode_bytes(&upload.bytes, &resolve_mime_type(upload))
}

/// Declared type first, then a guess from the file name.
pub fn resolve_mime_type(upload: &ReferenceUpload) -> String {
    upload
        .declared_type
        .clone()
        .or_else(|| {
            upload
                .file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// The checks `encode` would fail on, without producing the payload.
pub fn validate(upload: &ReferenceUpload) -> Result<()> {
    check(&upload.bytes, &resolve_mime_type(upload))
}

/// Read a file from disk and encode it. `declared_type` wins over the extension.
pub async fn encode_file(path: impl AsRef<Path>, declared_type: Option<&str>) -> Result<EncodedImage> {
    let upload = read_file(path, declared_type).await?;
    encode(&upload)
}

pub async fn read_file(path: impl AsRef<Path>, declared_type: Option<&str>) -> Result<ReferenceUpload> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log::error!("Failed to read reference image {}: {}", path.display(), e);
        StudioError::Encoding(format!("cannot read {}: {}", path.display(), e))
    })?;

    let mut upload = ReferenceUpload::new(bytes, declared_type.map(String::from));
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        upload = upload.with_file_name(name);
    }
    Ok(upload)
}

pub fn encode_bytes(bytes: &[u8], mime_type: &str) -> Result<EncodedImage> {
    check(bytes, mime_type)?;

    log::debug!("Encoding {} bytes of {}", bytes.len(), mime_type);

    Ok(EncodedImage {
        data: STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
    })
}

fn check(bytes: &[u8], mime_type: &str) -> Result<()> {
    if bytes.is_empty() {
        return Err(StudioError::Encoding("the file is empty".into()));
    }
    if !mime_type.starts_with("image/") {
        return Err(StudioError::Encoding(format!(
            "{} is not an image type",
            mime_type
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_encode_bytes() {
        let encoded = encode_bytes(&[1, 2, 3], "image/png").unwrap();
        assert_eq!(encoded.data, "AQID");
        assert_eq!(encoded.to_data_uri(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_rejects_empty_and_non_image() {
        assert!(matches!(
            encode_bytes(&[], "image/png"),
            Err(StudioError::Encoding(_))
        ));
        assert!(matches!(
            encode_bytes(b"hello", "text/plain"),
            Err(StudioError::Encoding(_))
        ));
    }

    #[test]
    fn test_mime_falls_back_to_file_name() {
        let upload = ReferenceUpload::new(vec![0xff, 0xd8, 0xff], None).with_file_name("dress.jpg");
        assert_eq!(encode(&upload).unwrap().mime_type, "image/jpeg");

        let upload = ReferenceUpload::new(vec![0xff], Some("image/webp".into()))
            .with_file_name("dress.jpg");
        assert_eq!(encode(&upload).unwrap().mime_type, "image/webp");

        let upload = ReferenceUpload::new(vec![0xff], None);
        assert!(encode(&upload).is_err());
        assert!(validate(&upload).is_err());
    }

    #[tokio::test]
    async fn test_encode_file_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"hi there").unwrap();

        let encoded = encode_file(file.path(), None).await.unwrap();
        assert_eq!(encoded.mime_type, "image/png");
        assert_eq!(encoded.to_data_uri(), "data:image/png;base64,aGkgdGhlcmU=");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_file(dir.path().join("missing.png"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::Encoding(_)));
    }
}
