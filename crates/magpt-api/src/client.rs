//! HTTP client for the generation backend
//!
//! Stateless request/response mapping for the four backend calls. Retry and
//! backoff belong to the callers; nothing here retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use magpt_config::PreferenceStore;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::ApiConfig,
    error::{ApiError, Result},
    models::{GenerateRequest, GenerateResponse, GenerationMetrics, HealthStatus, ModelCatalog},
};

/// Mockable backend client
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Probe `/health`
    async fn health(&self) -> Result<HealthStatus>;

    /// Fetch `/models`; `None` when the backend answers with a non-2xx status
    async fn list_models(&self) -> Result<Option<ModelCatalog>>;

    /// Run `/generate`; a non-2xx status carries the server's detail message
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    /// Fetch `/metrics`; `None` when the backend answers with a non-2xx status
    async fn metrics(&self) -> Result<Option<GenerationMetrics>>;
}

/// Production client over reqwest
pub struct HttpApiClient {
    client: Client,
    prefs: Arc<PreferenceStore>,
    config: ApiConfig,
}

impl HttpApiClient {
    /// Create a client reading the base URL from `prefs` on every call
    pub fn new(prefs: Arc<PreferenceStore>, config: ApiConfig) -> Result<Self> {
        // No client-wide timeout: generation must be allowed to run long
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::BuildError(e.to_string()))?;

        Ok(Self {
            client,
            prefs,
            config,
        })
    }

    /// Create a client with the default configuration
    pub fn with_defaults(prefs: Arc<PreferenceStore>) -> Result<Self> {
        Self::new(prefs, ApiConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Base URL currently in effect (the origin when the preference is empty)
    pub fn base_url(&self) -> String {
        let configured = self.prefs.api_url();
        let base = if configured.trim().is_empty() {
            self.config.origin.clone()
        } else {
            configured.trim().to_string()
        };
        base.trim_end_matches('/').to_string()
    }

    fn endpoint(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url(), path);
        url::Url::parse(&url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, timeout: Option<Duration>) -> Result<Response> {
        let request = match timeout {
            Some(limit) => request.timeout(limit),
            None => request,
        };
        request
            .send()
            .await
            .map_err(|e| ApiError::from_transport(e, timeout))
    }

    async fn decode<T: DeserializeOwned>(response: Response, timeout: Option<Duration>) -> Result<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(e, timeout))?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("/health")?;
        let timeout = Some(self.config.health_timeout);
        debug!("HTTP GET: {}", url);

        let response = self.send(self.client.get(&url), timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                detail: None,
            });
        }

        Self::decode(response, timeout).await
    }

    async fn list_models(&self) -> Result<Option<ModelCatalog>> {
        let url = self.endpoint("/models")?;
        let timeout = Some(self.config.lookup_timeout);
        debug!("HTTP GET: {}", url);

        let response = self.send(self.client.get(&url), timeout).await?;
        if !response.status().is_success() {
            warn!("Model list unavailable: HTTP {}", response.status());
            return Ok(None);
        }

        let catalog: ModelCatalog = Self::decode(response, timeout).await?;
        debug!("Listed {} models", catalog.models.len());
        Ok(Some(catalog))
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.endpoint("/generate")?;
        debug!(
            "HTTP POST: {} (max_new_tokens={}, model={:?})",
            url, request.max_new_tokens, request.model_id
        );

        let response = self.send(self.client.post(&url).json(request), None).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            warn!("Generation failed: HTTP {} ({:?})", status, detail);
            return Err(ApiError::Status { status, detail });
        }

        Self::decode(response, None).await
    }

    async fn metrics(&self) -> Result<Option<GenerationMetrics>> {
        let url = self.endpoint("/metrics")?;
        let timeout = Some(self.config.lookup_timeout);
        debug!("HTTP GET: {}", url);

        let response = self.send(self.client.get(&url), timeout).await?;
        if !response.status().is_success() {
            warn!("Metrics unavailable: HTTP {}", response.status());
            return Ok(None);
        }

        Ok(Some(Self::decode(response, timeout).await?))
    }
}

/// Pull the `detail` field out of an error body
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
