//! Share page handlers.
//!
//! Handles `GET /recipe/{id}`, `GET /invite/{id}` and `GET /cookbook/{id}`.
//! Every request gets a 200 card: missing content renders the fallback card.

use anyhow::Context;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::card::ContentKind;
use crate::compose;
use crate::error::UnfurlError;
use crate::state::AppState;

pub async fn recipe_page(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, UnfurlError> {
    share_page(&state, ContentKind::Recipe, &share_id(&uri)).await
}

pub async fn invite_page(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, UnfurlError> {
    share_page(&state, ContentKind::Invite, &share_id(&uri)).await
}

pub async fn cookbook_page(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, UnfurlError> {
    share_page(&state, ContentKind::Cookbook, &share_id(&uri)).await
}

/// Id segment of a share path, percent-decoded.
///
/// Bytes that are not valid UTF-8 after decoding are replaced rather than
/// rejected, so a mangled link still reaches the fallback card.
fn share_id(uri: &Uri) -> String {
    let segment = uri.path().rsplit('/').next().unwrap_or_default();
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}

async fn share_page(
    state: &AppState,
    kind: ContentKind,
    id: &str,
) -> Result<Response, UnfurlError> {
    let id = id.trim();
    let page = compose::compose(state, kind, id).await;

    tracing::info!(
        kind = %kind,
        id = %id,
        fallback = page.card.is_fallback(),
        "serving share page"
    );

    build_response(page.html, state.config.cache_max_age)
}

/// Build an HTTP response with HTML content and cache headers.
fn build_response(html: String, max_age: u32) -> Result<Response, UnfurlError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&format!("public, max-age={max_age}"))
            .context("invalid cache-control value")?,
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    Ok((StatusCode::OK, headers, html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_id_is_percent_decoded() {
        let id = |path: &str| share_id(&path.parse().unwrap());
        assert_eq!(id("/recipe/abc123"), "abc123");
        assert_eq!(id("/recipe/a%20b"), "a b");
        assert_eq!(id("/cookbook/caf%C3%A9"), "café");
    }

    #[test]
    fn undecodable_share_id_is_replaced_not_rejected() {
        let id = share_id(&"/recipe/%FF".parse().unwrap());
        assert_eq!(id, "\u{FFFD}");
    }

    #[test]
    fn response_headers() {
        let response = build_response("<p>hi</p>".to_string(), 300).unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=300");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn etag_tracks_content() {
        let etag = |html: &str| {
            build_response(html.to_string(), 300).unwrap().headers()[header::ETAG]
                .to_str()
                .unwrap()
                .to_string()
        };
        assert_eq!(etag("<p>a</p>"), etag("<p>a</p>"));
        assert_ne!(etag("<p>a</p>"), etag("<p>b</p>"));
        assert!(etag("<p>a</p>").starts_with('"'));
        assert_eq!(etag("<p>a</p>").len(), 18);
    }
}
