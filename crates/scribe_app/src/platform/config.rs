use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use scribe_core::{CancelMode, ClientSettings, LanguageTable};
use scribe_engine::{EngineConfig, ReconnectPolicy};
use scribe_logging::scribe_info;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelVia {
    /// `POST /cancel/{taskId}`.
    OutOfBand,
    /// `cancelTask` frame on the live channel.
    OverChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconnect {
    Fixed { delay_ms: u64 },
    Exponential { initial_ms: u64, max_ms: u64 },
}

/// Settings read from `scribe.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub channel_path: String,
    pub cancel_mode: CancelVia,
    pub reconnect: Reconnect,
    pub heartbeat_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Extra `code -> locale` entries on top of en/sp/pt.
    pub languages: BTreeMap<String, String>,
    pub log_destination: LogDestination,
    pub log_level: String,
    /// Open download links in the browser instead of only printing them.
    pub open_downloads: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            channel_path: "/ws".to_string(),
            cancel_mode: CancelVia::OverChannel,
            reconnect: Reconnect::Exponential {
                initial_ms: 1_000,
                max_ms: 30_000,
            },
            heartbeat_secs: 30,
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
            languages: BTreeMap::new(),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            open_downloads: true,
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = ron::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        scribe_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            server_url: self.server_url.clone(),
            channel_path: self.channel_path.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            heartbeat_interval: Duration::from_secs(self.heartbeat_secs.max(1)),
            reconnect: match self.reconnect {
                Reconnect::Fixed { delay_ms } => {
                    ReconnectPolicy::Fixed(Duration::from_millis(delay_ms))
                }
                Reconnect::Exponential { initial_ms, max_ms } => ReconnectPolicy::Exponential {
                    initial: Duration::from_millis(initial_ms),
                    max: Duration::from_millis(max_ms),
                },
            },
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        let mut languages = LanguageTable::default();
        for (code, tag) in &self.languages {
            languages.insert(code, tag.clone());
        }
        ClientSettings {
            cancel_mode: match self.cancel_mode {
                CancelVia::OutOfBand => CancelMode::OutOfBand,
                CancelVia::OverChannel => CancelMode::OverChannel,
            },
            languages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe.ron");
        fs::write(
            &path,
            r#"(
                server_url: "https://scribe.example.com",
                cancel_mode: OutOfBand,
                reconnect: Fixed(delay_ms: 500),
                languages: {"fr": "fr-FR"},
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server_url, "https://scribe.example.com");
        assert_eq!(config.channel_path, "/ws");

        let engine = config.engine_config();
        assert_eq!(engine.reconnect, ReconnectPolicy::Fixed(Duration::from_millis(500)));

        let client = config.client_settings();
        assert_eq!(client.cancel_mode, CancelMode::OutOfBand);
        assert_eq!(client.languages.resolve("fr"), Some("fr-FR"));
        assert_eq!(client.languages.resolve("en"), Some("en-US"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe.ron");
        fs::write(&path, "(server_url: 42)").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
