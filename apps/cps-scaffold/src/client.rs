//! # Scaffolding Backend HTTP Client
//!
//! Wrapper around the backend REST API: the chat endpoints used during a
//! conversation and the research endpoints used to browse recorded sessions.
//!
//! No retries and no backoff. Every failure surfaces once to the caller.

use crate::config::Config;
use cps_core::{
    ChatRequest, ChatResponse, CpsError, HealthResponse, SessionConversations, SessionCreate,
    SessionList, SessionResponse, SessionTransitions,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Cannot reach the backend.
    #[error("Cannot connect to backend at {0}")]
    ConnectionFailed(String),
    /// The configured base URL cannot carry a path.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
    /// 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Any other non-success status.
    #[error("Backend error ({0}): {1}")]
    Status(u16, String),
    /// Failed to parse response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<TransportError> for CpsError {
    fn from(err: TransportError) -> Self {
        CpsError::TransportError(err.to_string())
    }
}

/// HTTP client for the scaffolding backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client pointing at `base_url` with the transport's default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client from configuration. `timeout_secs == 0` keeps the default.
    pub fn from_config(config: &Config) -> Result<Self, CpsError> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let http = builder
            .build()
            .map_err(|e| CpsError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `segments` below the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, TransportError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| TransportError::InvalidUrl(self.base_url.clone()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, TransportError> {
        req.send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Handle HTTP response: check status codes and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(TransportError::NotFound(detail));
            }
            return Err(TransportError::Status(status.as_u16(), detail));
        }
        resp.json::<T>()
            .await
            .map_err(|e| TransportError::ParseError(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let req = self.http.get(self.url(segments)?).query(query);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, TransportError> {
        let req = self.http.post(self.url(segments)?).json(body);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    // -------------------------------------------------------------------------
    // Chat endpoints
    // -------------------------------------------------------------------------

    /// POST /api/chat/session → new session id.
    pub async fn create_session(
        &self,
        assignment_text: &str,
    ) -> Result<SessionResponse, TransportError> {
        let body = SessionCreate {
            assignment_text: assignment_text.to_string(),
        };
        self.post(&["api", "chat", "session"], &body).await
    }

    /// POST /api/chat/message → agent answer with scaffolding metadata.
    pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.post(&["api", "chat", "message"], request).await
    }

    /// GET /api/chat/health
    pub async fn health(&self) -> Result<HealthResponse, TransportError> {
        self.get(&["api", "chat", "health"], &[]).await
    }

    // -------------------------------------------------------------------------
    // Research endpoints
    // -------------------------------------------------------------------------

    /// GET /api/research/sessions → recorded sessions, newest first.
    pub async fn list_sessions(
        &self,
        user_id: Option<&str>,
        skip: u32,
        limit: u32,
    ) -> Result<SessionList, TransportError> {
        let mut query = vec![("skip", skip.to_string()), ("limit", limit.to_string())];
        if let Some(user) = user_id {
            query.push(("user_id", user.to_string()));
        }
        self.get(&["api", "research", "sessions"], &query).await
    }

    /// GET /api/research/sessions/{id}/conversations
    pub async fn session_conversations(
        &self,
        session_id: &str,
    ) -> Result<SessionConversations, TransportError> {
        self.get(&["api", "research", "sessions", session_id, "conversations"], &[])
            .await
    }

    /// GET /api/research/sessions/{id}/transitions
    pub async fn session_transitions(
        &self,
        session_id: &str,
    ) -> Result<SessionTransitions, TransportError> {
        self.get(&["api", "research", "sessions", session_id, "transitions"], &[])
            .await
    }
}

/// Pull `detail` out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
