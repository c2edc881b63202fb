//! services/client/src/lib.rs
//!
//! Client side of the support copilot: session credential handling, access
//! gating for the chat view, and the query/answer exchange with the backend.

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
