//! crates/copilot_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture, so session and
//! interaction logic never depends on a concrete HTTP stack or storage medium.

use async_trait::async_trait;

use crate::domain::{AuthMode, AuthRequest, CopilotQuery, CopilotResponse, Credential};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The request never got a response (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("Rejected with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, detail: Option<String> },

    /// The backend answered successfully but the body did not match the contract.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Durable credential storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable home of the session credential, surviving process restarts.
pub trait CredentialStorage: Send + Sync {
    /// Reads the persisted credential, if any.
    fn load(&self) -> PortResult<Option<Credential>>;

    fn save(&self, credential: &Credential) -> PortResult<()>;

    /// Removes the persisted entry. Clearing an absent entry is not an error.
    fn clear(&self) -> PortResult<()>;
}

#[async_trait]
pub trait AuthenticationService: Send + Sync {
    /// Exchanges a username and password for a credential at the endpoint chosen by `mode`.
    async fn authenticate(&self, mode: AuthMode, request: &AuthRequest) -> PortResult<Credential>;
}

#[async_trait]
pub trait CopilotService: Send + Sync {
    /// Asks the copilot a question. `credential` is attached as a bearer token when present.
    async fn ask(
        &self,
        query: &CopilotQuery,
        credential: Option<&Credential>,
    ) -> PortResult<CopilotResponse>;
}
