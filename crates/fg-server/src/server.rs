//! `FgServer` — Axum HTTP server.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
use axum::response::Json;
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fg_insights::{ChatService, NarrativeMapService};

use crate::config::ServerConfig;
use crate::routes::{coaching_chat, generate_narrative_map};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The narrative-map pipeline.
    pub narrative: Arc<NarrativeMapService>,
    /// The coaching chat service.
    pub chat: Arc<ChatService>,
    /// When the server started.
    pub start_time: Instant,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: &'static str,
    /// Seconds since start.
    pub uptime_secs: u64,
}

/// Permissive CORS matching the original function headers: any origin,
/// the dashboard's request headers allowed, preflights short-circuited.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

/// The narrative-map HTTP server.
pub struct FgServer {
    config: ServerConfig,
    state: AppState,
}

impl FgServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        narrative: Arc<NarrativeMapService>,
        chat: Arc<ChatService>,
    ) -> Self {
        Self {
            config,
            state: AppState {
                narrative,
                chat,
                start_time: Instant::now(),
            },
        }
    }

    /// Build the Axum router with all routes and layers.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/functions/v1/generate-narrative-map",
                post(generate_narrative_map),
            )
            .route("/functions/v1/coaching-chat", post(coaching_chat))
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
