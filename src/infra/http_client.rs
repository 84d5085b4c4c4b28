use crate::app::ports::{EventSource, FetchedEvent};
use crate::config::ApiConfig;
use crate::constants::{AUTH_HEADER, EVENT_ENDPOINT_PATH};
use crate::error::{ImportError, Result};
use async_trait::async_trait;
use std::fs;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Fetches `geteventfull` from the Aloom event API.
pub struct AloomHttpClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    event_id: String,
}

impl AloomHttpClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(api.timeout_seconds));

        if let Some(path) = api.ca_cert_path.as_deref().filter(|p| !p.trim().is_empty()) {
            let pem = fs::read(path)
                .map_err(|e| ImportError::Config(format!("Failed to read CA certificate '{}': {}", path, e)))?;
            let cert = reqwest::Certificate::from_pem(&pem)?;
            builder = builder.add_root_certificate(cert);
            debug!("Trusting additional CA from {}", path);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            token: api.token.clone(),
            event_id: api.event_id.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, EVENT_ENDPOINT_PATH)
    }
}

#[async_trait]
impl EventSource for AloomHttpClient {
    #[instrument(skip(self), fields(event_id = %self.event_id))]
    async fn fetch_event(&self) -> Result<FetchedEvent> {
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[("event_id", self.event_id.as_str())])
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?.to_vec();
        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes).chars().take(200).collect();
            return Err(ImportError::Api { status: status.as_u16(), message });
        }

        info!("Fetched event payload ({} bytes)", bytes.len());
        FetchedEvent::from_bytes(bytes)
    }
}

/// Reads a payload saved by an earlier `fetch`.
pub struct FileEventSource {
    path: std::path::PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn fetch_event(&self) -> Result<FetchedEvent> {
        let raw = tokio::fs::read(&self.path).await?;
        debug!("Read event payload from {}", self.path.display());
        FetchedEvent::from_bytes(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let api = ApiConfig {
            base_url: "https://tms.example.org/".into(),
            token: "t".into(),
            event_id: "42".into(),
            ..ApiConfig::default()
        };
        let client = AloomHttpClient::new(&api).unwrap();
        assert_eq!(client.endpoint(), "https://tms.example.org/eventapi/geteventfull");
    }

    #[test]
    fn test_missing_ca_file_is_config_error() {
        let api = ApiConfig {
            ca_cert_path: Some("/nonexistent/ca.pem".into()),
            ..ApiConfig::default()
        };
        assert!(matches!(AloomHttpClient::new(&api), Err(ImportError::Config(_))));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileEventSource::new("/nonexistent/payload.json");
        assert!(matches!(source.fetch_event().await, Err(ImportError::Io(_))));
    }
}
