use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub media: MediaConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/atelier.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Root directory for stored attachments. Each file lives at
    /// `{storage_path}/{media_id}/{file_name}`.
    pub storage_path: String,

    /// URL prefix under which `storage_path` is served.
    pub public_path: String,

    /// Per-image upload limit in kilobytes.
    pub max_image_kb: u64,

    /// Accepted image types, by extension name.
    pub allowed_image_types: Vec<String>,

    /// Whole request body limit for multipart forms, in megabytes.
    pub max_request_mb: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_path: "./storage".to_string(),
            public_path: "/storage".to_string(),
            max_image_kb: 5120,
            allowed_image_types: vec![
                "jpeg".to_string(),
                "jpg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
            max_request_mb: 64,
        }
    }
}

impl MediaConfig {
    /// Request body limit in bytes.
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_request_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            media: MediaConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Image types the upload validator knows how to recognise.
const KNOWN_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "webp"];

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("atelier").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".atelier").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.media.storage_path.trim().is_empty() {
            anyhow::bail!("media.storage_path cannot be empty");
        }

        if !self.media.public_path.starts_with('/') {
            anyhow::bail!("media.public_path must start with '/'");
        }

        if self.media.public_path.len() < 2 || self.media.public_path.ends_with('/') {
            anyhow::bail!("media.public_path must be a sub-path like '/storage', without a trailing '/'");
        }

        if self.media.max_request_mb == 0 || self.media.max_request_mb > 4096 {
            anyhow::bail!("media.max_request_mb must be between 1 and 4096");
        }

        if self.media.max_image_kb == 0 {
            anyhow::bail!("media.max_image_kb must be > 0");
        }

        if let Some(unknown) = self
            .media
            .allowed_image_types
            .iter()
            .find(|t| !KNOWN_IMAGE_TYPES.contains(&t.as_str()))
        {
            anyhow::bail!("Unsupported image type in media.allowed_image_types: {unknown}");
        }

        Ok(())
    }
}
