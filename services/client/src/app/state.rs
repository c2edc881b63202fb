//! services/client/src/app/state.rs
//!
//! Defines the application root state, created once at startup and shared with
//! every component that needs the session or the backend.

use std::sync::Arc;

use copilot_core::ports::{AuthenticationService, CopilotService, CredentialStorage};

use crate::adapters::{FileCredentialStorage, HttpBackend};
use crate::config::Config;
use crate::error::ClientError;

use super::gate::{AccessGate, Navigator};
use super::interaction::InteractionController;
use super::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub copilot: Arc<dyn CopilotService>,
}

impl AppState {
    /// Wires the HTTP backend and file storage described by `config`.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let backend = Arc::new(HttpBackend::new(config.api_base_url, config.request_timeout)?);
        let storage = Arc::new(FileCredentialStorage::new(config.token_path));
        Ok(Self::with_services(storage, backend.clone(), backend))
    }

    /// Wires arbitrary port implementations.
    pub fn with_services(
        storage: Arc<dyn CredentialStorage>,
        auth: Arc<dyn AuthenticationService>,
        copilot: Arc<dyn CopilotService>,
    ) -> Self {
        let session = Arc::new(SessionStore::initialize(storage, auth));
        Self { session, copilot }
    }

    pub fn navigator(&self) -> Navigator {
        Navigator::new(AccessGate::new(self.session.clone()))
    }

    pub fn interaction(&self) -> InteractionController {
        InteractionController::new(self.session.clone(), self.copilot.clone())
    }
}
