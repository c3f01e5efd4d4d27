use async_trait::async_trait;
use serde_json::Value;
use uci_core::{DashboardConfig, Record, RecordDraft, RegistryError};

use crate::{ensure_ok, parse_envelope_value};

/// Read and write access to the remote registry.
///
/// Futures are not required to be `Send` so browser fetch-based clients fit.
#[async_trait(?Send)]
pub trait RegistryTransport {
    /// Fetch the full record collection.
    async fn fetch_records(&self) -> Result<Vec<Record>, RegistryError>;

    /// Append one record. Storage and ordering are the server's business.
    async fn append_record(&self, draft: &RecordDraft) -> Result<(), RegistryError>;
}

/// JSON-over-HTTP client for the registry endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Joins `base_url` (scheme and host) with the configured endpoint path.
    pub fn from_config(base_url: &str, config: &DashboardConfig) -> Self {
        let base = base_url.trim_end_matches('/');
        let endpoint = config.endpoint.trim_start_matches('/');
        Self::new(format!("{base}/{endpoint}"))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The body envelope decides success, whatever the HTTP status.
    async fn read_envelope(&self, response: reqwest::Response) -> Result<Value, RegistryError> {
        let http_status = response.status();
        response.json::<Value>().await.map_err(|err| {
            RegistryError::Transport(format!(
                "{} returned HTTP {http_status} without a JSON envelope: {err}",
                self.url
            ))
        })
    }
}

#[async_trait(?Send)]
impl RegistryTransport for HttpTransport {
    async fn fetch_records(&self) -> Result<Vec<Record>, RegistryError> {
        tracing::debug!(url = %self.url, "fetching registry");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| RegistryError::Transport(format!("GET {} failed: {err}", self.url)))?;

        let envelope = self.read_envelope(response).await?;
        parse_envelope_value(&envelope)
    }

    async fn append_record(&self, draft: &RecordDraft) -> Result<(), RegistryError> {
        tracing::debug!(url = %self.url, "posting registry record");
        let response = self
            .client
            .post(&self.url)
            .json(draft)
            .send()
            .await
            .map_err(|err| RegistryError::Transport(format!("POST {} failed: {err}", self.url)))?;

        let envelope = self.read_envelope(response).await?;
        ensure_ok(&envelope)
    }
}
