use invoicedesk_core::{ClientId, FieldErrors, RemoteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The draft failed local validation; nothing was sent.
    #[error("draft has invalid fields: {0}")]
    Validation(FieldErrors),

    /// The server no longer knows this client.
    #[error("{message}")]
    NotFound {
        id: ClientId,
        message: String,
        #[source]
        source: RemoteError,
    },

    /// A remote call failed. `message` is the server's detail when it sent
    /// one, otherwise a generic description of the operation.
    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: RemoteError,
    },
}

impl StoreError {
    pub(crate) fn operation(source: RemoteError, fallback: &str) -> Self {
        Self::Operation {
            message: source.message_or(fallback),
            source,
        }
    }

    /// Like [`operation`](Self::operation), but a 404 becomes [`StoreError::NotFound`].
    pub(crate) fn targeting(id: ClientId, source: RemoteError, fallback: &str) -> Self {
        if source.is_not_found() {
            Self::NotFound {
                id,
                message: source.message_or("client not found"),
                source,
            }
        } else {
            Self::operation(source, fallback)
        }
    }

    /// The remote failure behind an operation-level error.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::NotFound { source, .. } | Self::Operation { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}
