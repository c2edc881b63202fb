//! services/client/src/app/frontend.rs
//!
//! Line-oriented front end: turns terminal input into session, navigation and
//! copilot actions, and returns the lines to print.

use std::sync::Arc;

use copilot_core::domain::AuthMode;
use tracing::info;

use super::gate::{Navigation, Navigator, View, CHAT_PATH, ROOT_PATH};
use super::interaction::{InteractionController, SubmitRejected};
use super::render::render_state;
use super::session::SessionStore;
use super::state::AppState;

const HELP: &[&str] = &[
    "Commands:",
    "  /login <username> <password>   log in",
    "  /signup <username> <password>  create an account and log in",
    "  /logout                        log out",
    "  /go <path>                     open /login, /signup or /chat",
    "  /whoami                        show the session status",
    "  /quit                          exit",
    "Any other line is sent to the copilot from the chat view.",
];

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Authenticate {
        mode: AuthMode,
        username: String,
        password: String,
    },
    Logout,
    Go(String),
    WhoAmI,
    Help,
    Quit,
    /// Free text for the chat input.
    Ask(String),
    /// A malformed command, with the usage line to show.
    Usage(&'static str),
}

impl Command {
    /// Lines starting with a known command name are commands. Everything else,
    /// including text that merely starts with `/`, is a question.
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "/login" | "/signup" => {
                let mode = AuthMode::from_signup_flag(name == "/signup");
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(username), Some(password), None) => Command::Authenticate {
                        mode,
                        username: username.to_string(),
                        password: password.to_string(),
                    },
                    _ if mode == AuthMode::Signup => {
                        Command::Usage("Usage: /signup <username> <password>")
                    }
                    _ => Command::Usage("Usage: /login <username> <password>"),
                }
            }
            "/logout" => Command::Logout,
            "/go" => match parts.next() {
                Some(path) => Command::Go(path.to_string()),
                None => Command::Usage("Usage: /go <path>"),
            },
            "/whoami" => Command::WhoAmI,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Ask(line.to_string()),
        }
    }
}

/// What the caller should do after a line has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Vec<String>),
    Quit,
}

pub struct Frontend {
    session: Arc<SessionStore>,
    navigator: Navigator,
    interaction: InteractionController,
    view: View,
}

impl Frontend {
    /// Opens the root path, which lands on the chat view or the login view.
    pub fn new(state: &AppState) -> Self {
        let mut navigator = state.navigator();
        let view = navigator.navigate(ROOT_PATH).view;
        Self {
            session: state.session.clone(),
            navigator,
            interaction: state.interaction(),
            view,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn location(&self) -> &str {
        self.navigator.location()
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn banner(&self) -> String {
        format!("== {} ({}) ==", self.view.title(), self.navigator.location())
    }

    pub async fn handle(&mut self, line: &str) -> Step {
        let mut out = Vec::new();

        match Command::parse(line) {
            Command::Quit => return Step::Quit,
            Command::Help => out.extend(HELP.iter().map(|l| l.to_string())),
            Command::Usage(usage) => out.push(usage.to_string()),
            Command::WhoAmI => {
                let status = if self.session.is_logged_in() {
                    "Logged in."
                } else {
                    "Not logged in."
                };
                out.push(format!("{} Current page: {}", status, self.location()));
            }
            Command::Go(path) => {
                let navigation = self.navigator.navigate(&path);
                self.show(navigation, true, &mut out);
            }
            Command::Authenticate {
                mode,
                username,
                password,
            } => match self.session.login(&username, &password, mode).await {
                Ok(()) => {
                    out.push(format!("{} succeeded. Welcome, {}.", mode.label(), username));
                    let navigation = self.navigator.navigate(CHAT_PATH);
                    self.show(navigation, true, &mut out);
                }
                Err(e) => out.push(format!("Authentication Error: {}", e.message)),
            },
            Command::Logout => {
                if let Err(e) = self.session.logout() {
                    out.push(format!(
                        "Warning: the stored credential could not be removed: {}",
                        e
                    ));
                }
                out.push("Logged out.".to_string());
                let navigation = self.navigator.refresh();
                self.show(navigation, false, &mut out);
            }
            Command::Ask(text) => self.ask(text, &mut out).await,
        }

        Step::Continue(out)
    }

    async fn ask(&mut self, text: String, out: &mut Vec<String>) {
        // The gate is consulted again on every use of the protected view.
        let navigation = self.navigator.refresh();
        self.show(navigation, false, out);
        if self.view != View::Chat {
            if !text.trim().is_empty() {
                out.push("Log in first with /login <username> <password>.".to_string());
            }
            return;
        }

        self.interaction.set_input(text);
        match self.interaction.submit().await {
            Ok(state) => out.extend(render_state(state)),
            Err(SubmitRejected::EmptyQuery) => {}
            Err(SubmitRejected::InFlight) => {
                out.push("Still processing the previous question.".to_string())
            }
        }
    }

    /// Applies a navigation result. Leaving the chat view discards its state.
    fn show(&mut self, navigation: Navigation, always_announce: bool, out: &mut Vec<String>) {
        let changed = navigation.view != self.view;
        if changed {
            info!(path = %navigation.path, "View changed to {}.", navigation.view.title());
        }
        if navigation.view != View::Chat {
            self.interaction.reset();
        }
        self.view = navigation.view;
        if changed || always_announce {
            out.push(self.banner());
        }
    }
}
