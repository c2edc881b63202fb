//! services/client/src/adapters/memory.rs
//!
//! Process-local `CredentialStorage`, for ephemeral sessions and tests.

use std::sync::{Mutex, PoisonError};

use copilot_core::domain::Credential;
use copilot_core::ports::{CredentialStorage, PortResult};

#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out as if `credential` had been persisted by an earlier run.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }

    /// Returns what is currently stored.
    pub fn stored(&self) -> Option<Credential> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> PortResult<Option<Credential>> {
        Ok(self.stored())
    }

    fn save(&self, credential: &Credential) -> PortResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
