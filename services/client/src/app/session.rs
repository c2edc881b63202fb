//! services/client/src/app/session.rs
//!
//! The session store: single owner of the credential, its durable mirror, and the
//! login/signup/logout flows that change it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use copilot_core::domain::{AuthMode, AuthRequest, Credential};
use copilot_core::ports::{AuthenticationService, CredentialStorage, PortError, PortResult};
use tracing::{error, info, warn};

use super::MALFORMED_RESPONSE_MESSAGE;

const UNKNOWN_NETWORK_ERROR_MESSAGE: &str = "An unknown network error occurred.";

/// A failed login or signup, with the message to show the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub mode: AuthMode,
    pub message: String,
}

/// Owns the current credential. Create one per application and share it through an `Arc`.
pub struct SessionStore {
    credential: RwLock<Option<Credential>>,
    storage: Arc<dyn CredentialStorage>,
    auth: Arc<dyn AuthenticationService>,
}

impl SessionStore {
    /// Adopts whatever credential an earlier run persisted. Purely local, no network.
    pub fn initialize(
        storage: Arc<dyn CredentialStorage>,
        auth: Arc<dyn AuthenticationService>,
    ) -> Self {
        let credential = storage.load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable persisted credential: {}", e);
            None
        });
        info!(logged_in = credential.is_some(), "Session store initialized.");

        Self {
            credential: RwLock::new(credential),
            storage,
            auth,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credential>> {
        self.credential.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The credential as of this call. Callers re-read it per request.
    pub fn credential(&self) -> Option<Credential> {
        self.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().is_some()
    }

    /// `Authorization` header value for outgoing requests, absent when logged out.
    pub fn authorization_header(&self) -> Option<String> {
        self.read().as_ref().map(Credential::bearer)
    }

    /// Replaces the credential and mirrors the change into durable storage.
    ///
    /// The in-memory value always takes the new value. The storage write happens
    /// under the same lock, so no reader sees memory and storage disagree. A
    /// storage failure is logged and returned.
    pub fn set_credential(&self, credential: Option<Credential>) -> PortResult<()> {
        let mut slot = self.credential.write().unwrap_or_else(PoisonError::into_inner);
        *slot = credential;

        let persisted = match slot.as_ref() {
            Some(credential) => self.storage.save(credential),
            None => self.storage.clear(),
        };
        if let Err(e) = &persisted {
            error!("Failed to persist credential change: {}", e);
        }
        persisted
    }

    /// Authenticates against the login or signup endpoint and adopts the returned credential.
    ///
    /// On failure the current credential is left untouched.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        mode: AuthMode,
    ) -> Result<(), AuthError> {
        let request = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.auth.authenticate(mode, &request).await {
            Ok(credential) => {
                if self.set_credential(Some(credential)).is_err() {
                    warn!("Logged in, but the session will not survive a restart.");
                }
                info!(username, "{} succeeded.", mode.label());
                Ok(())
            }
            Err(e) => {
                let message = auth_failure_message(&e);
                error!("{} failed: {}", mode.label(), message);
                Err(AuthError { mode, message })
            }
        }
    }

    pub fn logout(&self) -> PortResult<()> {
        info!("Logging out.");
        self.set_credential(None)
    }
}

fn auth_failure_message(err: &PortError) -> String {
    match err {
        PortError::Rejected {
            detail: Some(detail),
            ..
        } => detail.clone(),
        PortError::Malformed(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        _ => UNKNOWN_NETWORK_ERROR_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryCredentialStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Authentication double that replays a fixed outcome and records requests.
    struct ScriptedAuth {
        outcome: PortResult<Credential>,
        calls: Mutex<Vec<(AuthMode, String)>>,
    }

    impl ScriptedAuth {
        fn new(outcome: PortResult<Credential>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AuthenticationService for ScriptedAuth {
        async fn authenticate(
            &self,
            mode: AuthMode,
            request: &AuthRequest,
        ) -> PortResult<Credential> {
            self.calls
                .lock()
                .unwrap()
                .push((mode, request.username.clone()));
            self.outcome.clone()
        }
    }

    /// Storage that counts writes, optionally failing every one of them.
    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryCredentialStorage,
        saves: AtomicUsize,
        clears: AtomicUsize,
        fail: bool,
    }

    impl CredentialStorage for CountingStorage {
        fn load(&self) -> PortResult<Option<Credential>> {
            self.inner.load()
        }

        fn save(&self, credential: &Credential) -> PortResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Storage("disk full".to_string()));
            }
            self.inner.save(credential)
        }

        fn clear(&self) -> PortResult<()> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Storage("read-only".to_string()));
            }
            self.inner.clear()
        }
    }

    fn token(raw: &str) -> Credential {
        Credential::new(raw).unwrap()
    }

    fn never_called() -> Arc<ScriptedAuth> {
        ScriptedAuth::new(Err(PortError::Network("unused".to_string())))
    }

    #[test]
    fn initialize_adopts_the_persisted_credential() {
        let storage = Arc::new(MemoryCredentialStorage::with_credential(token("persisted")));
        let session = SessionStore::initialize(storage, never_called());

        assert!(session.is_logged_in());
        assert_eq!(session.credential(), Some(token("persisted")));
        assert_eq!(session.authorization_header().as_deref(), Some("Bearer persisted"));
    }

    #[test]
    fn credential_survives_a_restart_and_so_does_logout() {
        let storage = Arc::new(MemoryCredentialStorage::new());

        let first = SessionStore::initialize(storage.clone(), never_called());
        first.set_credential(Some(token("t-1"))).unwrap();
        let restarted = SessionStore::initialize(storage.clone(), never_called());
        assert_eq!(restarted.credential(), Some(token("t-1")));

        restarted.set_credential(None).unwrap();
        let restarted_again = SessionStore::initialize(storage, never_called());
        assert_eq!(restarted_again.credential(), None);
    }

    #[test]
    fn logged_in_tracks_every_mutation() {
        let session =
            SessionStore::initialize(Arc::new(MemoryCredentialStorage::new()), never_called());
        let sequence = [Some("a"), None, None, Some("b"), Some("c"), None];

        for step in sequence {
            session.set_credential(step.map(token)).unwrap();
            assert_eq!(session.is_logged_in(), step.is_some());
            assert_eq!(session.authorization_header().is_some(), step.is_some());
        }
    }

    #[test]
    fn each_mutation_persists_exactly_once() {
        let storage = Arc::new(CountingStorage::default());
        let session = SessionStore::initialize(storage.clone(), never_called());

        session.set_credential(Some(token("a"))).unwrap();
        session.set_credential(Some(token("b"))).unwrap();
        session.logout().unwrap();

        assert_eq!(storage.saves.load(Ordering::SeqCst), 2);
        assert_eq!(storage.clears.load(Ordering::SeqCst), 1);
        assert_eq!(storage.inner.stored(), None);
    }

    #[test]
    fn storage_failure_still_updates_memory() {
        let storage = Arc::new(CountingStorage {
            fail: true,
            ..CountingStorage::default()
        });
        let session = SessionStore::initialize(storage, never_called());

        let result = session.set_credential(Some(token("a")));
        assert!(matches!(result, Err(PortError::Storage(_))));
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn successful_login_adopts_and_persists_the_credential() {
        let storage = Arc::new(MemoryCredentialStorage::new());
        let auth = ScriptedAuth::new(Ok(token("fresh")));
        let session = SessionStore::initialize(storage.clone(), auth.clone());

        session.login("alice", "pw", AuthMode::Login).await.unwrap();

        assert!(session.is_logged_in());
        assert_eq!(storage.stored(), Some(token("fresh")));
        assert_eq!(
            auth.calls.lock().unwrap().as_slice(),
            &[(AuthMode::Login, "alice".to_string())]
        );
    }

    #[tokio::test]
    async fn signup_flag_selects_the_signup_endpoint() {
        let auth = ScriptedAuth::new(Ok(token("fresh")));
        let session =
            SessionStore::initialize(Arc::new(MemoryCredentialStorage::new()), auth.clone());

        session
            .login("bob", "pw", AuthMode::from_signup_flag(true))
            .await
            .unwrap();
        assert_eq!(auth.calls.lock().unwrap()[0].0, AuthMode::Signup);
    }

    #[tokio::test]
    async fn failed_login_reports_detail_and_keeps_the_old_credential() {
        let storage = Arc::new(MemoryCredentialStorage::with_credential(token("old")));
        let auth = ScriptedAuth::new(Err(PortError::Rejected {
            status: 400,
            detail: Some("Username already registered".to_string()),
        }));
        let session = SessionStore::initialize(storage.clone(), auth);

        let err = session.login("bob", "pw", AuthMode::Signup).await.unwrap_err();

        assert_eq!(err.message, "Username already registered");
        assert_eq!(err.mode, AuthMode::Signup);
        assert_eq!(session.credential(), Some(token("old")));
        assert_eq!(storage.stored(), Some(token("old")));
    }

    #[tokio::test]
    async fn failures_without_detail_use_the_generic_message() {
        for failure in [
            PortError::Network("connection refused".to_string()),
            PortError::Rejected {
                status: 502,
                detail: None,
            },
        ] {
            let session = SessionStore::initialize(
                Arc::new(MemoryCredentialStorage::new()),
                ScriptedAuth::new(Err(failure)),
            );
            let err = session.login("bob", "pw", AuthMode::Login).await.unwrap_err();
            assert_eq!(err.message, UNKNOWN_NETWORK_ERROR_MESSAGE);
            assert!(!session.is_logged_in());
        }
    }
}
