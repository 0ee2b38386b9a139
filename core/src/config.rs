use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Process configuration, loaded from a JSON file or defaulted.
///
/// The database path is `None` for an in-memory store (tests, dry runs)
/// and `Some(path)` for a file-backed store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: Option<String>,
    pub listen_addr: String,
    pub session_ttl_minutes: i64,
    pub geo: GeoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// When false, logins skip the HTTP lookup and record null geo fields.
    pub enabled: bool,
    pub endpoint: String,
    /// Bounded lookup timeout. A slow geolocation service degrades to
    /// null fields instead of blocking login.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            listen_addr: "127.0.0.1:9100".to_string(),
            session_ttl_minutes: 720,
            geo: GeoConfig::default(),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://ip-api.com/json".to_string(),
            timeout_secs: 3,
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }
}
