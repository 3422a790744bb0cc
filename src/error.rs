// Typed errors per collaborator. Only FetchError ends a cycle.

use crate::source::SummaryKind;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{kind} summary request failed: {source}")]
    Http {
        kind: SummaryKind,
        #[source]
        source: reqwest::Error,
    },
    #[error("{kind} summary returned HTTP {status}")]
    Status { kind: SummaryKind, status: u16 },
    #[error("{kind} summary is not valid JSON: {source}")]
    Decode {
        kind: SummaryKind,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn kind(&self) -> SummaryKind {
        match self {
            FetchError::Http { kind, .. }
            | FetchError::Status { kind, .. }
            | FetchError::Decode { kind, .. } => *kind,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encode {key}: {reason}")]
    Encode { key: String, reason: String },
    #[error("decode {key}: {reason}")]
    Decode { key: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("write request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("write rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
