//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{ai, auth, credits, health, payments, plans, ratings, users};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent in-flight AI requests.
/// Each one holds an upstream connection for the length of a generation.
const AI_MAX_CONCURRENT_REQUESTS: usize = 20;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /api/auth/register`, `POST /api/auth/login` - Sessions
/// - `GET /api/plans`, `GET /api/plans/:id` - Plan catalog
/// - `GET /api/ratings`, `GET /api/ratings/average` - Ratings
///
/// ## Bearer token
/// - `GET /api/users/me` - Caller's profile
/// - `POST /api/plans/subscribe`, `GET /api/plans/subscription/:user_id`
/// - `GET /api/credits`, `POST /api/credits/update` - Message usage
/// - `POST /api/ratings`, `GET /api/ratings/me`
/// - `POST /api/ai/generate` - AI proxy (message quota applies)
/// - `POST /api/payments/create`, `GET /api/payments/transaction/:id`,
///   `POST /api/payments/verify`
///
/// ## Admin key
/// - `GET /api/users` - All users
///
/// ## Signature verification
/// - `POST /api/payments/callback` - Payment provider callback
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let ai_routes = Router::new()
        .route("/generate", post(ai::generate))
        .layer(ConcurrencyLimitLayer::new(AI_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::me).patch(users::update_me))
        // Plans
        .route("/plans", get(plans::list_plans))
        .route("/plans/subscribe", post(plans::subscribe))
        .route("/plans/subscription/:user_id", get(plans::get_subscription))
        .route("/plans/:id", get(plans::get_plan))
        // Credits
        .route("/credits", get(credits::get_credits))
        .route("/credits/update", post(credits::update_credits))
        .route("/credits/reset/:user_id", post(credits::reset_credits))
        // Ratings
        .route("/ratings", get(ratings::list_ratings).post(ratings::submit_rating))
        .route("/ratings/average", get(ratings::average))
        .route("/ratings/me", get(ratings::my_rating))
        // Payments
        .route("/payments/create", post(payments::create_payment))
        .route("/payments/transaction/:id", get(payments::get_transaction))
        .route("/payments/verify", post(payments::verify_payment))
        .route("/payments/callback", post(payments::payment_callback))
        // AI routes (with their own concurrency limit)
        .nest("/ai", ai_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
