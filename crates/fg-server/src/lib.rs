//! # fg-server
//!
//! Axum HTTP server for the narrative-map service.
//!
//! - `POST /functions/v1/generate-narrative-map` — the insight pipeline
//! - `POST /functions/v1/coaching-chat` — single-pass chat assistant
//! - `GET /health` — liveness + uptime
//! - Permissive CORS on every response; `OPTIONS` preflights short-circuit
//! - Error taxonomy mapped to status codes: missing input → 400, no active
//!   engagement → 404, version conflict → 409, gateway rate-limit/billing →
//!   429/402, everything else → 500

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, FgServer};
