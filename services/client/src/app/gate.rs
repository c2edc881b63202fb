//! services/client/src/app/gate.rs
//!
//! Route table and access gate for the protected chat view.

use std::sync::Arc;

use tracing::{debug, warn};

use super::session::SessionStore;

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const CHAT_PATH: &str = "/chat";
pub const ROOT_PATH: &str = "/";

// Longest legal chain is fallback -> root -> chat -> login.
const MAX_REDIRECTS: usize = 8;

/// A path the front end can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    /// The protected chat view.
    Chat,
    /// Always redirects to the chat view, which defers the access decision to the gate.
    Root,
    /// Anything unknown. Redirects to the root.
    Fallback,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        match path.trim() {
            LOGIN_PATH => Route::Login,
            SIGNUP_PATH => Route::Signup,
            CHAT_PATH => Route::Chat,
            ROOT_PATH => Route::Root,
            _ => Route::Fallback,
        }
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Chat)
    }
}

/// A renderable screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Signup,
    Chat,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Login => "Log in",
            View::Signup => "Sign up",
            View::Chat => "Support Copilot",
        }
    }
}

/// What the gate decided for a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Render(View),
    Redirect(&'static str),
}

/// Admits or redirects based on the session's login status at the time of the call.
#[derive(Clone)]
pub struct AccessGate {
    session: Arc<SessionStore>,
}

impl AccessGate {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    /// Decides a single route. Never cached: a logout is visible on the next call.
    pub fn admit(&self, route: Route) -> Admission {
        if route.is_protected() && !self.session.is_logged_in() {
            return Admission::Redirect(LOGIN_PATH);
        }
        match route {
            Route::Login => Admission::Render(View::Login),
            Route::Signup => Admission::Render(View::Signup),
            Route::Chat => Admission::Render(View::Chat),
            Route::Root => Admission::Redirect(CHAT_PATH),
            Route::Fallback => Admission::Redirect(ROOT_PATH),
        }
    }
}

/// The outcome of navigating: where the front end ended up and what it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
    pub view: View,
}

/// Holds the current location. Redirects replace it rather than stacking history.
pub struct Navigator {
    gate: AccessGate,
    location: String,
}

impl Navigator {
    /// Starts at the root path. Call [`Navigator::navigate`] or
    /// [`Navigator::refresh`] to resolve the first view.
    pub fn new(gate: AccessGate) -> Self {
        Self {
            gate,
            location: ROOT_PATH.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Follows redirects from `path` until a view renders.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        let mut current = path.trim().to_string();

        for _ in 0..MAX_REDIRECTS {
            match self.gate.admit(Route::parse(&current)) {
                Admission::Render(view) => {
                    self.location = current.clone();
                    return Navigation {
                        path: current,
                        view,
                    };
                }
                Admission::Redirect(target) => {
                    debug!(from = %current, to = target, "Redirecting.");
                    current = target.to_string();
                }
            }
        }

        warn!(start = path, "Redirect limit reached, falling back to the login view.");
        self.location = LOGIN_PATH.to_string();
        Navigation {
            path: LOGIN_PATH.to_string(),
            view: View::Login,
        }
    }

    /// Re-evaluates the current location against the current session.
    pub fn refresh(&mut self) -> Navigation {
        let location = self.location.clone();
        self.navigate(&location)
    }
}
