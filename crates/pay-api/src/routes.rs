//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes (under `/api/v1`):
/// - quotes: PUT/GET `/quotes/{quote_id}`
/// - checkout sessions: GET/PATCH `/checkout-sessions/{id}`, POST `/checkout-sessions/{id}/complete`
/// - charge permissions: GET `/charge-permissions/{id}`, POST `/charge-permissions/{id}/close`
/// - charges: POST `/charges`, GET `/charges/{id}`, POST `/charges/{id}/capture`, POST `/charges/{id}/cancel`
/// - refunds: POST `/refunds`, GET `/refunds/{id}`
/// - POST `/authorize`
/// - GET `/buyers/{token}`, GET `/buttons/{kind}`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let checkout_routes = Router::new()
        .route(
            "/checkout-sessions/{session_id}",
            get(handlers::get_checkout_session).patch(handlers::update_checkout_session),
        )
        .route(
            "/checkout-sessions/{session_id}/complete",
            post(handlers::complete_checkout_session),
        );

    let permission_routes = Router::new()
        .route(
            "/charge-permissions/{permission_id}",
            get(handlers::get_charge_permission),
        )
        .route(
            "/charge-permissions/{permission_id}/close",
            post(handlers::close_charge_permission),
        );

    let charge_routes = Router::new()
        .route("/charges", post(handlers::create_charge))
        .route("/charges/{charge_id}", get(handlers::get_charge))
        .route("/charges/{charge_id}/capture", post(handlers::capture_charge))
        .route("/charges/{charge_id}/cancel", post(handlers::cancel_charge))
        .route("/refunds", post(handlers::create_refund))
        .route("/refunds/{refund_id}", get(handlers::get_refund))
        .route("/authorize", post(handlers::authorize));

    let api_routes = Router::new()
        .route(
            "/quotes/{quote_id}",
            put(handlers::put_quote).get(handlers::get_quote),
        )
        .merge(checkout_routes)
        .merge(permission_routes)
        .merge(charge_routes)
        .route("/buyers/{token}", get(handlers::get_buyer))
        .route("/buttons/{kind}", get(handlers::get_button));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
