//! Landing page, and the catch-all for paths no route or asset matches.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::card::ContentKind;
use crate::config::Config;
use crate::render::components::PAGE_CSS;
use crate::state::AppState;

/// Extensions treated as asset requests; a miss on one of these is a 404.
const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf", "eot", "webp",
];

/// Render the home page.
pub async fn home_page(State(state): State<AppState>) -> impl IntoResponse {
    landing(&state.config)
}

/// Response for a path the static directory could not satisfy.
///
/// Missing assets get a plain 404; anything else gets the landing page so
/// mistyped or retired share links still land somewhere useful.
pub fn fallback_page(config: &Config, uri: &Uri) -> Response {
    if is_asset_path(uri.path()) {
        tracing::debug!(path = %uri.path(), "asset not found");
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }
    landing(config).into_response()
}

fn is_asset_path(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or_default();
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn landing(config: &Config) -> Markup {
    let site = config.site_name.as_str();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (site) " - Share recipes with the people you cook for" }
                meta name="description" content="Share recipes, cookbooks, and household meal plans with family and friends.";
                meta property="og:title" content=(site);
                meta property="og:description" content="Share recipes, cookbooks, and household meal plans with family and friends.";
                meta property="og:type" content="website";
                meta property="og:url" content=(config.base_url);
                meta property="og:image" content=(ContentKind::Recipe.default_image_url(&config.base_url));
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                main class="home" {
                    h1 class="home-title" {
                        (site) span class="home-dot" { "." }
                    }
                    p class="home-tagline" {
                        "Recipes, meal plans, and grocery lists for the whole household."
                    }

                    div class="home-kinds" {
                        @for kind in ContentKind::ALL {
                            div class="home-kind" {
                                span class="home-emoji" { (kind.emoji()) }
                                span { (kind.noun()) "s" }
                            }
                        }
                    }

                    a class="btn" href=(config.app_store_url) { "Download on the App Store" }
                }
                footer class="footer" {
                    "Links to recipes, invites, and cookbooks open right in the app."
                }
            }
        }
    }
}
