//! # Flight Operations Desk Agent
//!
//! Request router and HTTP service for the operations desk.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │        POST /requests   POST /ask   GET /health             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      AgentContext                           │
//! │        load snapshot -> route -> optional write-back        │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │      ops-engine         │   │         ops-store            │
//! │  (rules over snapshot)  │   │  (versioned roster rows)     │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod error;
pub mod request;
pub mod response;
pub mod router;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use context::AgentContext;
pub use error::{AgentError, Result};
pub use request::{JsonRequestParser, RawRequest, RequestKind, RequestParser, StructuredRequest};
pub use response::{AgentResponse, ResponsePayload};
pub use router::{Routed, route};

/// Structured request endpoint
pub async fn requests_handler(
    State(ctx): State<AgentContext>,
    Json(raw): Json<RawRequest>,
) -> Result<Json<AgentResponse>> {
    let request = StructuredRequest::try_from(raw)?;
    Ok(Json(ctx.handle(&request).await?))
}

/// Free-text endpoint, routed through the configured parser
pub async fn ask_handler(State(ctx): State<AgentContext>, text: String) -> Result<Json<AgentResponse>> {
    Ok(Json(ctx.ask(&text).await?))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

/// Build the Axum router
pub fn build_router(ctx: AgentContext, cors_origins: &[String]) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(allowed_origins(cors_origins))
        .allow_headers(Any);

    Router::new()
        .route("/requests", post(requests_handler))
        .route("/ask", post(ask_handler))
        .route("/health", get(health_check))
        .with_state(ctx)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(parsed)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
