use std::time::Duration;

use url::Url;

use crate::backoff::ReconnectPolicy;
use crate::{FailureKind, SubmitError};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the transcription server, e.g. `http://localhost:8000`.
    pub server_url: String,
    /// Path of the live channel endpoint on the same host.
    pub channel_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            channel_path: "/ws".to_string(),
            connect_timeout: Duration::from_secs(10),
            // Uploads wait for the whole transcription.
            request_timeout: Duration::from_secs(300),
            heartbeat_interval: Duration::from_secs(30),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn endpoint(&self, path: &str) -> Result<Url, SubmitError> {
        let base = Url::parse(&self.server_url)
            .map_err(|err| SubmitError::new(FailureKind::InvalidUrl, err.to_string()))?;
        base.join(path)
            .map_err(|err| SubmitError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Websocket URL of the live channel, derived from the server URL.
    pub fn channel_url(&self) -> Result<Url, SubmitError> {
        let mut url = self.endpoint(&self.channel_path)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(SubmitError::new(
                    FailureKind::InvalidUrl,
                    format!("unsupported scheme {other}"),
                ))
            }
        };
        url.set_scheme(scheme).map_err(|()| {
            SubmitError::new(FailureKind::InvalidUrl, "cannot switch to websocket scheme")
        })?;
        Ok(url)
    }
}
