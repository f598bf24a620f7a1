use base64::{engine::general_purpose::STANDARD, Engine as _};
use mannequin_muse::{encoder, logger, GeminiClient, GeminiConfig, GenerationRequest};
use std::env;
use std::path::PathBuf;

/// cargo run --example generate -- <reference-image> [brand] [count]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    logger::init()?;

    let mut args = env::args().skip(1);
    let path = PathBuf::from(args.next().ok_or("usage: generate <reference-image> [brand] [count]")?);
    let brand = args.next().unwrap_or_else(|| "Elegance".to_string());
    let count: i32 = args.next().map(|c| c.parse()).transpose()?.unwrap_or(1);

    let client = GeminiClient::new(GeminiConfig::from_env()?)?;
    let reference = encoder::encode_file(&path, None).await?;
    let request = GenerationRequest::new(reference, &brand, count);

    let images = client.generate_batch(&request).await?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("reference")
        .to_string();
    for (index, uri) in images.iter().enumerate() {
        let (header, data) = uri.split_once(',').ok_or("malformed data URI")?;
        let extension = header
            .trim_start_matches("data:")
            .trim_end_matches(";base64")
            .rsplit('/')
            .next()
            .unwrap_or("png");
        let output = path.with_file_name(format!("{}-mannequin-{}.{}", stem, index + 1, extension));
        std::fs::write(&output, STANDARD.decode(data)?)?;
        log::info!("💾 Saved {}", output.display());
    }

    Ok(())
}
