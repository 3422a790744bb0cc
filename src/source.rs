// Upstream summary source. The three summaries are fetched concurrently and joined;
// any single failure fails the whole fetch. No retries here.

use crate::error::FetchError;
use crate::models::{FlowSummary, SessionSummary, StatSummary, Summaries};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKind {
    Session,
    Flow,
    Stat,
}

impl SummaryKind {
    pub fn path(self) -> &'static str {
        match self {
            SummaryKind::Session => "getSessionSummary",
            SummaryKind::Flow => "getFlowSummary",
            SummaryKind::Stat => "getStatSummary",
        }
    }
}

impl std::fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SummaryKind::Session => "session",
            SummaryKind::Flow => "flow",
            SummaryKind::Stat => "stat",
        })
    }
}

#[async_trait::async_trait]
pub trait SummarySource: Send + Sync {
    /// Fetch session, flow and stat summaries. All-or-nothing.
    async fn fetch_all(&self) -> Result<Summaries, FetchError>;
}

/// Fetches summaries over HTTP as JSON. The per-request timeout bounds a hung upstream.
pub struct HttpSummarySource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSummarySource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("http client: {}", e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, kind: SummaryKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    async fn fetch<T: DeserializeOwned>(&self, kind: SummaryKind) -> Result<T, FetchError> {
        let resp = self
            .client
            .get(self.url(kind))
            .send()
            .await
            .map_err(|source| FetchError::Http { kind, source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                kind,
                status: status.as_u16(),
            });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|source| FetchError::Http { kind, source })?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { kind, source })
    }
}

#[async_trait::async_trait]
impl SummarySource for HttpSummarySource {
    #[instrument(skip(self), fields(source = "http", operation = "fetch_all", base_url = %self.base_url))]
    async fn fetch_all(&self) -> Result<Summaries, FetchError> {
        let (session, flow, stat) = tokio::try_join!(
            self.fetch::<SessionSummary>(SummaryKind::Session),
            self.fetch::<FlowSummary>(SummaryKind::Flow),
            self.fetch::<StatSummary>(SummaryKind::Stat),
        )?;
        Ok(Summaries {
            session,
            flow,
            stat,
        })
    }
}
