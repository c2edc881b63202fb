//! services/client/src/app/interaction.rs
//!
//! This module drives a single question-and-answer cycle with the copilot backend
//! and keeps the state the chat view renders from.

use std::sync::Arc;

use copilot_core::domain::{CopilotQuery, CopilotResponse, Credential, InteractionState};
use copilot_core::ports::{CopilotService, PortError, PortResult};
use tracing::{info, warn};
use uuid::Uuid;

use super::session::SessionStore;
use super::MALFORMED_RESPONSE_MESSAGE;

pub const NETWORK_ERROR_MESSAGE: &str = "A network error occurred.";
pub const SERVER_ERROR_MESSAGE: &str = "Authentication Failed or Server Error";

/// Why a submission was refused. A refused submission changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("the query is empty")]
    EmptyQuery,
    /// Submission is disabled while an exchange is pending.
    #[error("a query is already in flight")]
    InFlight,
}

/// An exchange that has entered Pending and still needs its backend call.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub exchange_id: Uuid,
    pub query: CopilotQuery,
    /// The session credential as of submission time.
    pub credential: Option<Credential>,
}

impl PendingQuery {
    pub async fn dispatch(&self, copilot: &dyn CopilotService) -> PortResult<CopilotResponse> {
        copilot.ask(&self.query, self.credential.as_ref()).await
    }
}

/// State machine for the chat view: Idle, Pending, Succeeded or Failed.
pub struct InteractionController {
    session: Arc<SessionStore>,
    copilot: Arc<dyn CopilotService>,
    input: String,
    state: InteractionState,
    in_flight: Option<Uuid>,
}

impl InteractionController {
    pub fn new(session: Arc<SessionStore>, copilot: Arc<dyn CopilotService>) -> Self {
        Self {
            session,
            copilot,
            input: String::new(),
            state: InteractionState::Idle,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Edits the input field. The field is disabled while a query is pending, so
    /// edits are ignored then and `false` is returned.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.state.is_pending() {
            return false;
        }
        self.input = text.into();
        true
    }

    /// Whether a submission would currently be accepted.
    pub fn can_submit(&self) -> bool {
        !self.state.is_pending() && CopilotQuery::new(self.input.as_str()).is_some()
    }

    /// Validates the input and enters Pending, dropping any previous answer or error.
    pub fn begin(&mut self) -> Result<PendingQuery, SubmitRejected> {
        if self.state.is_pending() {
            return Err(SubmitRejected::InFlight);
        }
        let query = CopilotQuery::new(self.input.as_str()).ok_or(SubmitRejected::EmptyQuery)?;

        let exchange_id = Uuid::new_v4();
        self.state = InteractionState::Pending;
        self.in_flight = Some(exchange_id);
        info!(%exchange_id, "Copilot query submitted.");

        Ok(PendingQuery {
            exchange_id,
            query,
            credential: self.session.credential(),
        })
    }

    /// Resolves the pending exchange `exchange_id` with the backend's result.
    ///
    /// Results for any other exchange are ignored.
    pub fn complete(
        &mut self,
        exchange_id: Uuid,
        result: PortResult<CopilotResponse>,
    ) -> &InteractionState {
        if self.in_flight != Some(exchange_id) {
            warn!(%exchange_id, "Ignoring result for an exchange that is no longer pending.");
            return &self.state;
        }
        self.in_flight = None;

        self.state = match result {
            Ok(response) => {
                info!(
                    %exchange_id,
                    validation_status = response.validation_status().as_str(),
                    sources = response.sources().len(),
                    "Copilot answered."
                );
                self.input.clear();
                InteractionState::Succeeded(response)
            }
            Err(e) => {
                warn!(%exchange_id, "Copilot query failed: {}", e);
                InteractionState::Failed(failure_message(&e))
            }
        };
        &self.state
    }

    /// Submits the current input and waits for the outcome.
    pub async fn submit(&mut self) -> Result<&InteractionState, SubmitRejected> {
        let pending = self.begin()?;
        let result = pending.dispatch(self.copilot.as_ref()).await;
        Ok(self.complete(pending.exchange_id, result))
    }

    /// Back to Idle with an empty input, as when the chat view is left.
    pub fn reset(&mut self) {
        if let Some(exchange_id) = self.in_flight.take() {
            info!(%exchange_id, "Abandoning pending exchange.");
        }
        self.input.clear();
        self.state = InteractionState::Idle;
    }
}

fn failure_message(err: &PortError) -> String {
    match err {
        PortError::Rejected {
            detail: Some(detail),
            ..
        } => detail.clone(),
        PortError::Rejected { detail: None, .. } => SERVER_ERROR_MESSAGE.to_string(),
        PortError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
        PortError::Malformed(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        PortError::Storage(reason) => reason.clone(),
    }
}
