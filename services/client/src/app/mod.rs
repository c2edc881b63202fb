pub mod frontend;
pub mod gate;
pub mod interaction;
pub mod protocol;
pub mod render;
pub mod session;
pub mod state;

/// Shown when the backend answers successfully but breaks the response contract.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "The server returned a malformed response.";

// Re-export the pieces the binary and the integration tests wire together.
pub use frontend::{Command, Frontend, Step};
pub use gate::{AccessGate, Admission, Navigation, Navigator, Route, View};
pub use interaction::{InteractionController, PendingQuery, SubmitRejected};
pub use session::{AuthError, SessionStore};
pub use state::AppState;
