// SPDX-FileCopyrightText: 2026 Sura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the recipe REST API.
//!
//! Handles POST /api/chat, GET /api/recommend, GET /api/recommend/{ranking},
//! GET /api/ingredients, GET /health. The streaming chat endpoint lives in
//! [`crate::stream`].

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sura_chat::ChatResponse;
use sura_core::{ChatRequest, TrendingIngredient, TrendingRecipe};
use sura_storage::queries::trending;
use tracing::warn;

use crate::server::GatewayState;

/// Number of recipes returned by the random recommendation endpoint.
const RECOMMENDATION_SAMPLE: usize = 4;

/// Number of ingredients returned by the trending-ingredient endpoint.
const INGREDIENT_LIMIT: usize = 10;

/// Response body for GET /api/recommend.
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    /// Random sample of trending recipes.
    pub recommendations: Vec<TrendingRecipe>,
}

/// Response body for GET /api/ingredients.
#[derive(Debug, Serialize)]
pub struct IngredientsResponse {
    /// Top trending ingredients by sales rank.
    pub ingredients: Vec<TrendingIngredient>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// POST /api/chat
///
/// Non-streaming variant: runs the full conversation and returns the recipe
/// plus a best-effort preview as one JSON object. Generation failures arrive
/// as an inline `<error>` body, never as an HTTP error.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    Json(state.engine.complete_chat(request).await)
}

/// GET /api/recommend
///
/// Random sample of trending recipes. A storage failure degrades to an
/// empty list with a logged warning.
pub async fn get_recommendations(
    State(state): State<GatewayState>,
) -> Json<RecommendationsResponse> {
    let recommendations = match trending::sample_hot_recipes(&state.db, RECOMMENDATION_SAMPLE).await
    {
        Ok(recipes) => recipes,
        Err(e) => {
            warn!(error = %e, "trending recipe lookup failed");
            Vec::new()
        }
    };
    Json(RecommendationsResponse { recommendations })
}

/// GET /api/recommend/{ranking}
///
/// Detail view of one trending recipe; 404 when the ranking is absent.
pub async fn get_recipe_detail(
    State(state): State<GatewayState>,
    Path(ranking): Path<i64>,
) -> Response {
    match trending::get_hot_recipe(&state.db, ranking).await {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no trending recipe with ranking {ranking}"),
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, ranking, "trending recipe detail lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "trending store unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/ingredients
///
/// Top trending ingredients. A storage failure degrades to an empty list.
pub async fn get_trending_ingredients(
    State(state): State<GatewayState>,
) -> Json<IngredientsResponse> {
    let ingredients = match trending::top_ingredients(&state.db, INGREDIENT_LIMIT).await {
        Ok(ingredients) => ingredients,
        Err(e) => {
            warn!(error = %e, "trending ingredient lookup failed");
            Vec::new()
        }
    };
    Json(IngredientsResponse { ingredients })
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
