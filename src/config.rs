use crate::error::{Result, StudioError};
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub session_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
}

impl GeminiConfig {
    /// Fails when the key is empty; a client without a credential is never built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StudioError::MissingCredential(format!(
                "{} environment variable not set",
                API_KEY_VAR
            )));
        }

        Ok(GeminiConfig {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).unwrap_or_default();
        let mut config = GeminiConfig::new(api_key)?;

        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.is_empty()) {
            config.model = model;
        }
        if let Some(base_url) = lookup("GEMINI_BASE_URL").filter(|u| !u.is_empty()) {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(host) = lookup("HOST").filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(mb) = lookup("MAX_UPLOAD_MB") {
            let mb: usize = parse_var("MAX_UPLOAD_MB", &mb)?;
            config.max_upload_bytes = mb.checked_mul(1024 * 1024).ok_or_else(|| {
                StudioError::Config(format!("MAX_UPLOAD_MB is too large: {}", mb))
            })?;
        }
        if let Some(secs) = lookup("SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(parse_var("SESSION_TTL_SECS", &secs)?);
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl Config {
    pub fn new(gemini: GeminiConfig) -> Self {
        Config {
            gemini,
            server: ServerConfig::default(),
        }
    }

    /// Loads everything from the process environment. A missing API key is fatal.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            gemini: GeminiConfig::from_env()?,
            server: ServerConfig::from_env()?,
        })
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StudioError::Config(format!("{} has an invalid value: {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = GeminiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, StudioError::MissingCredential(_)));

        let err = GeminiConfig::from_lookup(lookup(&[("API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, StudioError::MissingCredential(_)));
    }

    #[test]
    fn test_gemini_defaults_and_overrides() {
        let config = GeminiConfig::from_lookup(lookup(&[("API_KEY", "k")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(
            config.generate_content_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image:generateContent"
        );

        let config = GeminiConfig::from_lookup(lookup(&[
            ("API_KEY", "k"),
            ("GEMINI_MODEL", "other-model"),
            ("GEMINI_BASE_URL", "http://localhost:9000/"),
        ]))
        .unwrap();
        assert_eq!(
            config.generate_content_url(),
            "http://localhost:9000/models/other-model:generateContent"
        );
    }

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "3000"),
            ("MAX_UPLOAD_MB", "2"),
            ("SESSION_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(config.session_ttl, Duration::from_secs(60));

        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, StudioError::Config(_)));

        let huge = usize::MAX.to_string();
        let err = ServerConfig::from_lookup(lookup(&[("MAX_UPLOAD_MB", huge.as_str())])).unwrap_err();
        assert!(matches!(err, StudioError::Config(ref m) if m.contains("too large")));
    }
}
