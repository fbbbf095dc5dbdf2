//! Collaborator seams: the directory service, the classification service, and
//! the operator's confirmation prompt.
//!
//! The HTTP client in `invoicedesk-sync` implements both service ports; tests
//! substitute mocks.

use async_trait::async_trait;
use thiserror::Error;

use crate::analysis::AnalysisResult;
use crate::client::{ClientDraft, ClientId, ClientRecord};

/// A remote call that did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never completed (connection refused, timeout, TLS...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered 404.
    #[error("not found: {}", detail.as_deref().unwrap_or("no detail"))]
    NotFound { detail: Option<String> },

    /// The server answered with another non-2xx status.
    #[error("server returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl RemoteError {
    /// The server-reported `detail` message, if the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound { detail } | Self::Rejected { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Server detail verbatim when present, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// CRUD access to the remote client directory.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// `GET /clientes`
    async fn list_clients(&self) -> Result<Vec<ClientRecord>, RemoteError>;

    /// `POST /clientes`
    async fn create_client(&self, draft: &ClientDraft) -> Result<ClientRecord, RemoteError>;

    /// `PUT /clientes/{id}` (full replacement)
    async fn update_client(
        &self,
        id: ClientId,
        draft: &ClientDraft,
    ) -> Result<ClientRecord, RemoteError>;

    /// `DELETE /clientes/{id}`
    async fn delete_client(&self, id: ClientId) -> Result<(), RemoteError>;
}

/// The remote invoice classification service.
#[async_trait]
pub trait ClassificationApi: Send + Sync {
    /// `POST /analisar-nota`
    async fn classify(&self, text: &str) -> Result<AnalysisResult, RemoteError>;
}

/// Asks the operator a yes/no question before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
