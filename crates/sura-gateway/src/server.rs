// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use sura_chat::ChatEngine;
use sura_core::SuraError;
use sura_storage::Database;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::stream;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Conversation engine (retrieval + prompt + retry orchestration).
    pub engine: ChatEngine,
    /// Read-only trending store.
    pub db: Database,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Gateway server configuration (mirrors ServerConfig from sura-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the full application router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/chat/stream", post(stream::post_chat_stream))
        .route("/api/chat", post(handlers::post_chat))
        .route("/api/recommend", get(handlers::get_recommendations))
        .route("/api/recommend/{ranking}", get(handlers::get_recipe_detail))
        .route("/api/ingredients", get(handlers::get_trending_ingredients))
        .route("/health", get(handlers::get_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), SuraError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SuraError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| SuraError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8000"));
    }
}
