//! Axum HTTP gateway exposing the document generation endpoints.
//!
//! Endpoints are stateless: form content arrives with each request and is
//! never stored server-side.

mod handlers;
mod server;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::generation::GenerationOrchestrator;

/// Maximum request body size (64KB); a filled form is a few KB.
pub const MAX_BODY_SIZE: usize = 65_536;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: GenerationOrchestrator,
}
