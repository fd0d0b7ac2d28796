//! Throttled client for the remote user-session validation service.
//!
//! The service answers `GET /user-sessions/validate?sessionId=<uuid>` with
//! `{ "sessionId": "<uuid>", "valid": true }`. [`ThrottledSessionClient`]
//! runs each validation through a shared [`TokenBucketGate`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::SessionError;
use crate::gate::TokenBucketGate;

/// Base address of the session service when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

const VALIDATE_PATH: &str = "/user-sessions/validate";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response body of the validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidationResponse {
    pub session_id: String,
    pub valid: bool,
}

/// Unthrottled blocking HTTP client for the session service.
#[derive(Debug, Clone)]
pub struct UserSessionClient {
    http: Client,
    base_url: String,
}

impl UserSessionClient {
    /// Creates a client for the service at `base_url` (scheme, host and port).
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the service whether `session_id` is valid.
    ///
    /// # Errors
    /// [`SessionError::Http`] on transport failures, non-2xx statuses and
    /// undecodable bodies.
    pub fn validate_session(&self, session_id: Uuid) -> Result<SessionValidationResponse, SessionError> {
        let url = format!("{}{}", self.base_url, VALIDATE_PATH);
        debug!(%session_id, "validating user session");

        let response = self
            .http
            .get(url)
            .query(&[("sessionId", session_id.to_string())])
            .send()?
            .error_for_status()?
            .json::<SessionValidationResponse>()?;
        Ok(response)
    }
}

/// [`UserSessionClient`] whose calls are admitted by a rate-limiting gate.
///
/// Clones share the same gate, so the limit applies across all of them.
#[derive(Debug, Clone)]
pub struct ThrottledSessionClient {
    client: UserSessionClient,
    gate: Arc<TokenBucketGate>,
}

impl ThrottledSessionClient {
    pub fn new(client: UserSessionClient, gate: Arc<TokenBucketGate>) -> Self {
        Self { client, gate }
    }

    /// Validates a session once the gate admits the call.
    ///
    /// # Errors
    /// [`SessionError::Gate`] when the gate refuses admission, otherwise the
    /// errors of [`UserSessionClient::validate_session`].
    pub fn validate_session(&self, session_id: Uuid) -> Result<SessionValidationResponse, SessionError> {
        self.gate.execute(|| self.client.validate_session(session_id))?
    }
}
