//! Hosted Session Client
//!
//! Asks the shop backend to open a hosted checkout session. The backend holds
//! the processor's secret key; this side only sends the line items and buyer.

use checkout_core::{HostedSessionRequest, SessionId};
use serde::Deserialize;

use crate::error::{PaymentError, Result};

/// Body returned by the session endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    #[serde(alias = "id", alias = "session_id")]
    session_id: Option<String>,

    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the session endpoint
#[derive(Clone, Debug)]
pub struct HttpSessionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSessionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the line items and return the new session id
    pub async fn create_session(&self, request: &HostedSessionRequest) -> Result<SessionId> {
        tracing::debug!(
            endpoint = %self.endpoint,
            items = request.items.len(),
            user_id = %request.user_id,
            "Requesting hosted checkout session"
        );

        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        parse_session_response(status, &body)
    }
}

fn parse_session_response(status: reqwest::StatusCode, body: &str) -> Result<SessionId> {
    let parsed = serde_json::from_str::<SessionResponse>(body);

    if !status.is_success() {
        let detail = parsed
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(PaymentError::Session(detail));
    }

    let response = parsed?;
    match response.session_id {
        Some(id) if !id.is_empty() => Ok(SessionId::new(id)),
        _ => Err(PaymentError::Session(
            response.error.unwrap_or_else(|| "No session id returned".into()),
        )),
    }
}
