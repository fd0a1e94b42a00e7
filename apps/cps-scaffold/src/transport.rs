//! # Chat Transport
//!
//! The seam between the conversation controller and the network. The
//! controller only needs two calls; [`ApiClient`] provides them over HTTP and
//! tests substitute their own implementations.

use crate::client::{ApiClient, TransportError};
use cps_core::{ChatRequest, ChatResponse, SessionResponse};
use std::future::Future;

/// Request/response calls the conversation needs from the backend.
pub trait ChatTransport {
    /// Create a session whose assignment is `assignment_text`.
    fn create_session(
        &self,
        assignment_text: &str,
    ) -> impl Future<Output = Result<SessionResponse, TransportError>> + Send;

    /// Send one learner message with its history.
    fn send_message(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, TransportError>> + Send;
}

impl ChatTransport for ApiClient {
    async fn create_session(&self, assignment_text: &str) -> Result<SessionResponse, TransportError> {
        ApiClient::create_session(self, assignment_text).await
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        ApiClient::send_message(self, request).await
    }
}
