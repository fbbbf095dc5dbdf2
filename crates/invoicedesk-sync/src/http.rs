//! HTTP client for the directory (`/clientes`) and classification
//! (`/analisar-nota`) endpoints.

use std::time::Duration;

use async_trait::async_trait;
use invoicedesk_core::{
    AnalysisRequest, AnalysisResult, ClassificationApi, ClientDraft, ClientId, ClientRecord,
    DirectoryApi, RemoteError,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// The `detail` field of an error response body, if it has one.
    ///
    /// The directory service sends `{"detail": "..."}`; request validation
    /// failures send `{"detail": [{"msg": "..."}, ...]}`, which is flattened
    /// into one line.
    pub fn detail(&self) -> Option<String> {
        let Self::Server { body, .. } = self else {
            return None;
        };
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }
}

impl From<SyncError> for RemoteError {
    fn from(e: SyncError) -> Self {
        match &e {
            SyncError::Http(inner) if inner.is_decode() => RemoteError::Decode(inner.to_string()),
            SyncError::Http(inner) => RemoteError::Transport(inner.to_string()),
            SyncError::Json(inner) => RemoteError::Decode(inner.to_string()),
            SyncError::Server { status, .. } => {
                let detail = e.detail();
                if *status == StatusCode::NOT_FOUND.as_u16() {
                    RemoteError::NotFound { detail }
                } else {
                    RemoteError::Rejected {
                        status: *status,
                        detail,
                    }
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// HTTP client for both remote services. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL.
    ///
    /// `base_url` should be like `http://localhost:8000`; a trailing slash is
    /// dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Like [`new`](Self::new) with a per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /clientes`
    pub async fn fetch_clients(&self) -> Result<Vec<ClientRecord>, SyncError> {
        let url = self.url("/clientes");
        info!(url = %url, "fetching clients");
        let clients: Vec<ClientRecord> = self.send_json(self.client.get(&url)).await?;
        info!(count = clients.len(), "fetched clients");
        Ok(clients)
    }

    /// `GET /clientes/{id}`
    pub async fn fetch_client(&self, id: ClientId) -> Result<ClientRecord, SyncError> {
        let url = self.url(&format!("/clientes/{id}"));
        info!(url = %url, "fetching client");
        self.send_json(self.client.get(&url)).await
    }

    /// `POST /clientes`
    pub async fn post_client(&self, draft: &ClientDraft) -> Result<ClientRecord, SyncError> {
        let url = self.url("/clientes");
        info!(url = %url, "creating client");
        self.send_json(self.client.post(&url).json(draft)).await
    }

    /// `PUT /clientes/{id}`
    pub async fn put_client(
        &self,
        id: ClientId,
        draft: &ClientDraft,
    ) -> Result<ClientRecord, SyncError> {
        let url = self.url(&format!("/clientes/{id}"));
        info!(url = %url, "updating client");
        self.send_json(self.client.put(&url).json(draft)).await
    }

    /// `DELETE /clientes/{id}`
    pub async fn remove_client(&self, id: ClientId) -> Result<(), SyncError> {
        let url = self.url(&format!("/clientes/{id}"));
        info!(url = %url, "deleting client");
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    /// `POST /analisar-nota`
    pub async fn analyze_invoice(&self, text: &str) -> Result<AnalysisResult, SyncError> {
        let url = self.url("/analisar-nota");
        info!(url = %url, chars = text.chars().count(), "requesting invoice analysis");
        let body = AnalysisRequest {
            text: text.to_string(),
        };
        self.send_json(self.client.post(&url).json(&body)).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health, SyncError> {
        let url = self.url("/health");
        self.send_json(self.client.get(&url)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, SyncError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "request rejected");
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SyncError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DirectoryApi for ApiClient {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteError> {
        Ok(self.fetch_clients().await?)
    }

    async fn create_client(&self, draft: &ClientDraft) -> Result<ClientRecord, RemoteError> {
        Ok(self.post_client(draft).await?)
    }

    async fn update_client(
        &self,
        id: ClientId,
        draft: &ClientDraft,
    ) -> Result<ClientRecord, RemoteError> {
        Ok(self.put_client(id, draft).await?)
    }

    async fn delete_client(&self, id: ClientId) -> Result<(), RemoteError> {
        Ok(self.remove_client(id).await?)
    }
}

#[async_trait]
impl ClassificationApi for ApiClient {
    async fn classify(&self, text: &str) -> Result<AnalysisResult, RemoteError> {
        Ok(self.analyze_invoice(text).await?)
    }
}
