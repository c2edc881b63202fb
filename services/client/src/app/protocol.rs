//! services/client/src/app/protocol.rs
//!
//! Defines the JSON bodies exchanged with the copilot backend under `/api`.

use copilot_core::domain::{CopilotResponse, ValidationStatus};
use copilot_core::ports::{PortError, PortResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

//=========================================================================================
// Bodies Sent FROM the Client TO the Backend
//=========================================================================================

/// Body of `POST /login` and `POST /signup`.
#[derive(Serialize, Debug)]
pub struct CredentialsPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of `POST /copilot`.
#[derive(Serialize, Debug)]
pub struct QueryPayload<'a> {
    pub text: &'a str,
}

//=========================================================================================
// Bodies Sent FROM the Backend TO the Client
//=========================================================================================

/// Successful authentication. Fields such as `token_type` are ignored.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Successful copilot answer, exactly as it arrives on the wire.
#[derive(Deserialize, Debug)]
pub struct CopilotResponseRecord {
    pub query: String,
    pub answer: String,
    pub source_chunks: Vec<String>,
    pub similarity_scores: Vec<String>,
    pub validation_status: String,
}

impl CopilotResponseRecord {
    pub fn to_domain(self) -> PortResult<CopilotResponse> {
        CopilotResponse::new(
            self.query,
            self.answer,
            self.source_chunks,
            self.similarity_scores,
            ValidationStatus::new(self.validation_status),
        )
        .map_err(|e| PortError::Malformed(e.to_string()))
    }
}

/// Failure body. `detail` is usually a string but validation failures send a list.
#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Pulls a human-readable `detail` out of an error body, if there is one.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        Value::Null => None,
        Value::String(detail) if detail.trim().is_empty() => None,
        Value::String(detail) => Some(detail),
        other => Some(other.to_string()),
    }
}
