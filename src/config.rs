//! Configuration module for the GeoTrace event API
//! Handles server, Elasticsearch backend, and GeoIP database settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Elasticsearch backend configuration
    pub elastic: ElasticConfig,
    /// GeoIP database configuration
    pub geoip: GeoIpConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Elasticsearch backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Elasticsearch base URL
    pub url: Url,
    /// Username for basic authentication
    pub username: String,
    /// Password for basic authentication
    pub password: String,
    /// Index patterns searched by the events endpoint, joined with commas
    pub index_patterns: Vec<String>,
}

/// GeoIP database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// Path to the GeoLite2 City database
    pub city_db_path: String,
    /// Path to the GeoLite2 ASN database
    pub asn_db_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            elastic: ElasticConfig::default(),
            geoip: GeoIpConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:9200").unwrap(),
            username: "elastic".to_string(),
            password: "changeme".to_string(),
            index_patterns: vec![
                "filebeat-*".to_string(),
                "suricata-*".to_string(),
                "zeek-*".to_string(),
                "*".to_string(),
            ],
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            city_db_path: "/geoip/GeoLite2-City.mmdb".to_string(),
            asn_db_path: "/geoip/GeoLite2-ASN.mmdb".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.server.port = port.parse().context("Invalid SERVER_PORT")?;
        }

        if let Ok(url) = std::env::var("ELASTIC_URL") {
            self.elastic.url = Url::parse(&url).context("Invalid ELASTIC_URL")?;
        }

        if let Ok(username) = std::env::var("ELASTIC_USER") {
            self.elastic.username = username;
        }

        if let Ok(password) = std::env::var("ELASTIC_PASS") {
            self.elastic.password = password;
        }

        if let Ok(path) = std::env::var("GEO_CITY_DB") {
            self.geoip.city_db_path = path;
        }

        if let Ok(path) = std::env::var("GEO_ASN_DB") {
            self.geoip.asn_db_path = path;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeout cannot be 0"));
        }

        if self.elastic.index_patterns.is_empty() {
            return Err(anyhow::anyhow!("At least one index pattern is required"));
        }

        if self.geoip.city_db_path.is_empty() || self.geoip.asn_db_path.is_empty() {
            return Err(anyhow::anyhow!("GeoIP database paths cannot be empty"));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Comma-joined index pattern list for the search URL
    pub fn index_path(&self) -> String {
        self.elastic.index_patterns.join(",")
    }
}
