//! Application router configuration for the expense API.

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    cors::{AllowHeaders, Any, CorsLayer},
    services::ServeDir,
};

use crate::{
    AppState, endpoints,
    error::get_404_not_found,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, edit_expense_endpoint,
        get_expense_endpoint, get_expense_summary_endpoint, list_expenses_endpoint,
    },
};

/// How long browsers may cache the response to a CORS preflight request.
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Return a router with all the app's routes.
///
/// Requests that do not match an API route are served from the static
/// directory if one is configured, otherwise they get a JSON 404 response.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE_SUMMARY,
            get(get_expense_summary_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(edit_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .layer(cors_layer(&state.cors_allowed_origins));

    let router = match &state.static_dir {
        Some(static_dir) => api_routes.fallback_service(ServeDir::new(static_dir)),
        None => api_routes.fallback(get_404_not_found),
    };

    router.with_state(state)
}

/// Allow cross-origin requests from `allowed_origins`, or from any origin if
/// there are none.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(CORS_MAX_AGE);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(origin) => Some(origin),
            Err(error) => {
                tracing::warn!("Ignoring invalid CORS origin {origin:?}: {error}");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    // Credentials cannot be combined with wildcard headers.
    layer
        .allow_origin(origins)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
