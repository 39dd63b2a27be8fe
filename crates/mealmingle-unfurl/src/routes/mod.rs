//! Route definitions for the unfurl service.
//!
//! ## Routes
//!
//! - `GET /` - Landing page
//! - `GET /health` - Health check (JSON)
//! - `GET /robots.txt` - Crawler instructions
//! - `GET /recipe/{id}` - Recipe share page
//! - `GET /invite/{id}` - Household invite share page
//! - `GET /cookbook/{id}` - Cookbook share page
//! - anything else - static file, 404 for a missing asset, or the landing page

mod health;
mod home;
mod share;

use std::any::Any;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;

use crate::error::internal_error_response;
use crate::state::AppState;

/// Build the complete unfurl service router.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let not_found = (move |uri: Uri| {
        let config = config.clone();
        async move { home::fallback_page(&config, &uri) }
    })
    .into_service();
    let static_files = ServeDir::new(&state.config.static_dir).fallback(not_found);

    Router::new()
        .route("/", get(home::home_page))
        .route("/health", get(health::health_check))
        .route("/robots.txt", get(robots_txt))
        .route("/recipe/{id}", get(share::recipe_page))
        .route("/invite/{id}", get(share::invite_page))
        .route("/cookbook/{id}", get(share::cookbook_page))
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Serve robots.txt allowing all crawlers.
///
/// We want crawlers to fetch these pages for link previews.
async fn robots_txt() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        "User-agent: *\nAllow: /\n",
    )
}

/// Turn a panic anywhere in a handler into the generic 500 page.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");

    internal_error_response()
}
