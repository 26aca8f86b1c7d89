//! HTTP client for the narration oracle.
//!
//! One [`OracleClient`] per engine. Calls are awaited inline by the run
//! loop, so at most one request is outstanding and the state is never
//! mutated while a reply is pending.

use std::time::Duration;

use deeptime_types::{
    AdvisorRequest, AdvisorResponse, EventDescription, EventRequest, GameState,
    InterventionRequest, ModerationRequest, ModerationVerdict, SimulationResponse,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Encode a state for the `state` field of an oracle request.
///
/// The oracle treats a missing snapshot as a calm world, so an encoding
/// failure is logged and the field left empty.
pub fn state_snapshot(state: &GameState) -> Option<serde_json::Value> {
    serde_json::to_value(state)
        .inspect_err(|e| warn!(error = %e, "state snapshot not encodable, sending none"))
        .ok()
}

/// Errors from talking to the oracle.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure, timeout, or undecodable body.
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The oracle refused the request with HTTP 429.
    #[error("oracle is cooling down: {0}")]
    RateLimited(String),

    /// Any other non-success status.
    #[error("oracle returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
}

/// Client for the oracle HTTP API.
#[derive(Debug, Clone)]
pub struct OracleClient {
    client: reqwest::Client,
    base_url: String,
}

impl OracleClient {
    /// Create a client for the oracle at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `path`. A status in `accepted` is decoded like a
    /// success.
    async fn post<B, T>(&self, path: &str, body: &B, accepted: &[StatusCode]) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "oracle responded");
        if status.is_success() || accepted.contains(&status) {
            return Ok(response.json().await?);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited(body));
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Ask whether `text` may be used as an intervention.
    pub async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ClientError> {
        let request = ModerationRequest {
            text: text.to_owned(),
        };
        self.post("/api/moderate", &request, &[]).await
    }

    /// Narrate an intervention.
    ///
    /// A moderation denial (HTTP 400) is returned as a normal response with
    /// `parse_ok == false`.
    pub async fn simulate_intervention(
        &self,
        request: &InterventionRequest,
    ) -> Result<SimulationResponse, ClientError> {
        self.post("/api/simulate/intervention", request, &[StatusCode::BAD_REQUEST])
            .await
    }

    /// Narrate a world event.
    pub async fn simulate_event(&self, summary: Option<&str>) -> Result<SimulationResponse, ClientError> {
        let request = EventRequest {
            event: EventDescription {
                summary: summary.map(ToOwned::to_owned),
            },
        };
        self.post("/api/simulate/event", &request, &[]).await
    }

    /// Ask for strategy suggestions.
    pub async fn advisor(&self, state: &GameState) -> Result<AdvisorResponse, ClientError> {
        let request = AdvisorRequest {
            state: state_snapshot(state),
        };
        self.post("/api/advisor", &request, &[]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = OracleClient::new("http://127.0.0.1:8787/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8787");
    }

    #[test]
    fn snapshot_carries_entropy_debt() {
        let mut state = GameState::default();
        state.resources.entropy_debt = 42.0;
        let snapshot = state_snapshot(&state);
        assert_eq!(
            deeptime_types::snapshot_entropy_debt(snapshot.as_ref()),
            Some(42.0)
        );
    }

    #[tokio::test]
    async fn unreachable_oracle_is_an_http_error() {
        // Nothing listens on the discard port.
        let client = OracleClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.moderate("hello").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
