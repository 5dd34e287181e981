use crate::domain::ports::ModelRuntime;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const LIST_TIMEOUT: Duration = Duration::from_secs(10);
// Pulls stream gigabytes on first run; create may quantize.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(1800);

/// Ollama management API client: probe `/`, `/api/pull`, `/api/create`,
/// `/api/tags`. Pull and create are idempotent on the runtime side.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TRANSFER_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn ensure_ok(resp: reqwest::Response, what: &str) -> Result<()> {
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Err(ProvisionError::RuntimeError {
                message: format!("{}: HTTP {}: {}", what, status, body.trim()),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[async_trait]
impl ModelRuntime for OllamaClient {
    async fn probe(&self) -> Result<()> {
        // Tolerant by design: any HTTP response means the process is up and
        // answering, the status code is irrelevant for this endpoint.
        let resp = self
            .client
            .get(format!("{}/", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;
        tracing::debug!("probe answered with HTTP {}", resp.status());
        Ok(())
    }

    async fn pull(&self, reference: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&serde_json::json!({ "name": reference, "stream": false }))
            .send()
            .await?;
        Self::ensure_ok(resp, &format!("pull {}", reference)).await
    }

    async fn create(&self, name: &str, modelfile: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/create", self.base_url))
            .json(&serde_json::json!({
                "name": name,
                "modelfile": modelfile,
                "stream": false,
            }))
            .send()
            .await?;
        Self::ensure_ok(resp, &format!("create {}", name)).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(LIST_TIMEOUT)
            .send()
            .await?;
        let body: TagsResponse = resp.error_for_status()?.json().await?;
        Ok(body.models.into_iter().map(|m| m.name).collect())
    }
}
