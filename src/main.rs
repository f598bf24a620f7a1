use mannequin_muse::{logger, studio, Config, GeminiClient};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };

    logger::log_startup_info("Mannequin Muse", env!("CARGO_PKG_VERSION"), &config);

    let client = GeminiClient::new(config.gemini.clone())?;
    studio::run(config.server, client.generator()).await?;

    log::info!("👋 Studio stopped");
    Ok(())
}
