use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Application configuration
///
/// Loaded once at startup and passed to each component at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub media_server: MediaServerConfig,
    pub auth_directory: AuthDirectoryConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Media server connection settings
///
/// `url` doubles as the stream base URL used in generated playlists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaServerConfig {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthDirectoryConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    /// Byte length of generated subscriber tokens before base64 encoding
    #[serde(default = "default_token_length")]
    pub token_length: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_length() -> usize {
    32
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            token_length: default_token_length(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./playlist-service.db".to_string(),
                max_connections: Some(10),
            },
            web: WebConfig {
                host: default_host(),
                port: default_port(),
            },
            media_server: MediaServerConfig {
                url: "http://localhost:8080".to_string(),
                username: "admin".to_string(),
                password: String::new(),
                timeout_secs: default_timeout_secs(),
            },
            auth_directory: AuthDirectoryConfig {
                url: "http://localhost:8090".to_string(),
                api_key: String::new(),
                timeout_secs: default_timeout_secs(),
            },
            playlist: PlaylistConfig::default(),
        }
    }
}

impl MediaServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with any trailing slash removed, for stream URL construction
    pub fn stream_base_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }
}

impl AuthDirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
