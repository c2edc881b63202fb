//! crates/copilot_core/src/domain.rs
//!
//! Defines the pure, core data structures for the copilot client.
//! These structs are independent of any transport or serialization format.

use std::fmt;

//=========================================================================================
// Session Credential
//=========================================================================================

/// An opaque bearer token identifying an authenticated session.
///
/// A `Credential` is never empty: "holding a credential" and "being logged in"
/// are the same thing.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token. Returns `None` for empty or whitespace-only tokens.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value of an `Authorization` header carrying this credential.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens never show up in logs or panics.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

//=========================================================================================
// Authentication
//=========================================================================================

/// Which authentication endpoint a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    pub fn from_signup_flag(is_signup: bool) -> Self {
        if is_signup {
            AuthMode::Signup
        } else {
            AuthMode::Login
        }
    }

    /// Path of the endpoint, relative to the API base.
    pub fn endpoint(self) -> &'static str {
        match self {
            AuthMode::Login => "/login",
            AuthMode::Signup => "/signup",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Signup => "Signup",
        }
    }
}

/// A username/password pair submitted to the login or signup endpoint.
#[derive(Clone)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

//=========================================================================================
// Copilot Exchange
//=========================================================================================

/// A free-text question for the copilot. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopilotQuery {
    text: String,
}

impl CopilotQuery {
    /// Returns `None` when `text` is empty or whitespace-only. The text is kept verbatim.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One retrieved passage paired with its similarity score label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChunk {
    pub text: String,
    pub score: String,
}

/// Raised when a response carries a different number of chunks and scores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response has {chunks} source chunks but {scores} similarity scores")]
pub struct EvidenceMismatch {
    pub chunks: usize,
    pub scores: usize,
}

/// The copilot's answer together with its grounding evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopilotResponse {
    query: String,
    answer: String,
    sources: Vec<SourceChunk>,
    validation_status: ValidationStatus,
}

impl CopilotResponse {
    /// Builds a response, pairing `source_chunks[i]` with `similarity_scores[i]`.
    ///
    /// Fails when the two sequences differ in length.
    pub fn new(
        query: String,
        answer: String,
        source_chunks: Vec<String>,
        similarity_scores: Vec<String>,
        validation_status: ValidationStatus,
    ) -> Result<Self, EvidenceMismatch> {
        if source_chunks.len() != similarity_scores.len() {
            return Err(EvidenceMismatch {
                chunks: source_chunks.len(),
                scores: similarity_scores.len(),
            });
        }

        let sources = source_chunks
            .into_iter()
            .zip(similarity_scores)
            .map(|(text, score)| SourceChunk { text, score })
            .collect();

        Ok(Self {
            query,
            answer,
            sources,
            validation_status,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Retrieved passages in the order the backend ranked them.
    pub fn sources(&self) -> &[SourceChunk] {
        &self.sources
    }

    pub fn source_chunks(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.text.as_str())
    }

    pub fn similarity_scores(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.score.as_str())
    }

    pub fn validation_status(&self) -> &ValidationStatus {
        &self.validation_status
    }
}

//=========================================================================================
// Validation Status
//=========================================================================================

const GROUNDED_MARKER: &str = "GROUNDED";
const REJECTED_MARKER: &str = "REJECTED";
const ERROR_MARKER: &str = "ERROR";

/// How the backend vetted an answer. An open tag, e.g. `GROUNDED` or `REJECTED_LOW_CONTEXT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationStatus(String);

/// Presentation severity derived from a [`ValidationStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Grounded,
    Rejected,
    Error,
    Neutral,
}

impl ValidationStatus {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the tag by substring. The first matching marker wins, in the
    /// order grounded, rejected, error.
    pub fn class(&self) -> StatusClass {
        if self.0.contains(GROUNDED_MARKER) {
            StatusClass::Grounded
        } else if self.0.contains(REJECTED_MARKER) {
            StatusClass::Rejected
        } else if self.0.contains(ERROR_MARKER) {
            StatusClass::Error
        } else {
            StatusClass::Neutral
        }
    }

    /// Human-readable form: underscores become spaces.
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

//=========================================================================================
// Interaction State
//=========================================================================================

/// Lifecycle of a single query/response exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Pending,
    Succeeded(CopilotResponse),
    Failed(String),
}

impl InteractionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, InteractionState::Pending)
    }

    pub fn response(&self) -> Option<&CopilotResponse> {
        match self {
            InteractionState::Succeeded(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InteractionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_tokens_are_not_credentials() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        let credential = Credential::new("abc.def").unwrap();
        assert_eq!(credential.bearer(), "Bearer abc.def");
    }

    #[test]
    fn credential_debug_hides_the_token() {
        let credential = Credential::new("super-secret").unwrap();
        assert!(!format!("{credential:?}").contains("super-secret"));
    }

    #[test]
    fn blank_queries_are_rejected() {
        assert!(CopilotQuery::new("").is_none());
        assert!(CopilotQuery::new("   ").is_none());
        assert_eq!(
            CopilotQuery::new(" reset password ").unwrap().text(),
            " reset password "
        );
    }

    #[test]
    fn status_classes_follow_marker_precedence() {
        let cases = [
            ("GROUNDED_STRICT", StatusClass::Grounded),
            ("GROUNDED", StatusClass::Grounded),
            ("REJECTED_LOW_CONTEXT", StatusClass::Rejected),
            ("INTERNAL_ERROR", StatusClass::Error),
            ("VALIDATION_ERROR", StatusClass::Error),
            ("PENDING_REVIEW", StatusClass::Neutral),
            ("HALLUCINATED", StatusClass::Neutral),
            // Several markers at once: the first in precedence order wins.
            ("REJECTED_GROUNDED", StatusClass::Grounded),
            ("REJECTED_BY_ERROR", StatusClass::Rejected),
        ];
        for (tag, expected) in cases {
            assert_eq!(ValidationStatus::new(tag).class(), expected, "tag {tag}");
        }
    }

    #[test]
    fn status_label_replaces_underscores() {
        assert_eq!(
            ValidationStatus::new("REJECTED_LOW_CONTEXT").label(),
            "REJECTED LOW CONTEXT"
        );
    }

    #[test]
    fn response_pairs_chunks_with_scores_in_order() {
        let response = CopilotResponse::new(
            "q".into(),
            "a".into(),
            strings(&["chunk A", "chunk B", "chunk C"]),
            strings(&["0.91", "0.77", "0.40"]),
            ValidationStatus::new("GROUNDED"),
        )
        .unwrap();

        assert_eq!(response.sources().len(), 3);
        assert_eq!(response.sources()[1].text, "chunk B");
        assert_eq!(response.sources()[1].score, "0.77");
        assert_eq!(
            response.similarity_scores().collect::<Vec<_>>(),
            vec!["0.91", "0.77", "0.40"]
        );
    }

    #[test]
    fn response_rejects_mismatched_evidence() {
        let err = CopilotResponse::new(
            "q".into(),
            "a".into(),
            strings(&["chunk A", "chunk B"]),
            strings(&["0.91"]),
            ValidationStatus::new("GROUNDED"),
        )
        .unwrap_err();
        assert_eq!(err, EvidenceMismatch { chunks: 2, scores: 1 });
    }
}
