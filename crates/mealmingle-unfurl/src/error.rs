//! Error types for the unfurl service.
//!
//! Missing content never reaches this type: resolvers fail soft and the
//! fallback policy always produces a card. What is left are failures the
//! viewer can do nothing about, rendered as a generic HTML error page.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, Markup, html};

/// Unfurl service error type.
#[derive(Debug, thiserror::Error)]
pub enum UnfurlError {
    /// Internal server error (response construction, rendering, etc.).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for UnfurlError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
            }
        }

        internal_error_response()
    }
}

/// The 500 response shared by handler errors and caught panics.
///
/// The body never carries internal detail.
pub fn internal_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, error_page()).into_response()
}

fn error_page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Server error" }
                meta name="robots" content="noindex";
                style { (maud::PreEscaped(crate::render::components::ERROR_CSS)) }
            }
            body {
                main class="error-page" {
                    h1 { "Server error" }
                    p { "Something went wrong while preparing this page. Please try again later." }
                    a href="/" { "Back to home" }
                }
            }
        }
    }
}
