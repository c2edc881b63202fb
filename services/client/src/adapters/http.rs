//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the copilot backend.
//! It implements the `AuthenticationService` and `CopilotService` ports from the `core` crate.

use std::time::Duration;

use async_trait::async_trait;
use copilot_core::domain::{AuthMode, AuthRequest, CopilotQuery, CopilotResponse, Credential};
use copilot_core::ports::{AuthenticationService, CopilotService, PortError, PortResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::app::protocol::{
    extract_detail, CopilotResponseRecord, CredentialsPayload, QueryPayload, TokenResponse,
};

const COPILOT_ENDPOINT: &str = "/copilot";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that talks JSON over HTTP to the backend rooted at `base_url`.
///
/// The adapter holds no session state. Each call receives the credential to attach,
/// so the header always reflects the session at the moment of the call.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a new `HttpBackend`. `timeout` bounds each request end to end.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// Turns a response into `T`, mapping non-success statuses and undecodable bodies.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PortError::Rejected {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }

    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| PortError::Malformed(e.to_string()))
}

fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Network(e.to_string())
}

//=========================================================================================
// `AuthenticationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthenticationService for HttpBackend {
    async fn authenticate(&self, mode: AuthMode, request: &AuthRequest) -> PortResult<Credential> {
        let url = self.url(mode.endpoint());
        debug!(%url, username = %request.username, "Sending authentication request.");

        let response = self
            .client
            .post(&url)
            .json(&CredentialsPayload {
                username: &request.username,
                password: &request.password,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let token: TokenResponse = read_json(response).await?;
        Credential::new(token.access_token)
            .ok_or_else(|| PortError::Malformed("access_token is empty".to_string()))
    }
}

//=========================================================================================
// `CopilotService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CopilotService for HttpBackend {
    async fn ask(
        &self,
        query: &CopilotQuery,
        credential: Option<&Credential>,
    ) -> PortResult<CopilotResponse> {
        let url = self.url(COPILOT_ENDPOINT);
        debug!(%url, authenticated = credential.is_some(), "Sending copilot query.");

        let mut request = self
            .client
            .post(&url)
            .json(&QueryPayload { text: query.text() });
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.as_str());
        }

        let response = request.send().await.map_err(transport_error)?;
        let record: CopilotResponseRecord = read_json(response).await?;
        record.to_domain()
    }
}
