//! Meal Mingle Unfurl - server-rendered share pages for Meal Mingle links.
//!
//! Shared links to recipes, household invites and cookbooks land here.
//! Social apps, SMS previews and crawlers read the Open Graph and Twitter
//! metadata; real visitors are sent on to the app through a deep link, or to
//! the App Store when the app is not installed.
//!
//! # Architecture
//!
//! - **Resolve**: Looks up the shared item in the backing document store
//! - **Fallback**: Turns missing or partial records into a presentable card
//! - **Compose**: Maps the card onto the share template's placeholders
//! - **Render**: Substitutes placeholders and conditional blocks
//!
//! # URL Pattern
//!
//! ```text
//! GET /recipe/{id}
//! GET /invite/{id}
//! GET /cookbook/{id}
//! ```
//!
//! Every share URL answers 200. Content that no longer exists, or that the
//! store could not deliver in time, gets a generic card for its kind.
//!
//! # Security
//!
//! - All interpolated text is HTML-escaped by maud
//! - Image URLs are validated (HTTPS/HTTP only) before use in attributes
//! - Error pages never include internal detail

pub mod card;
pub mod compose;
pub mod config;
pub mod error;
pub mod fallback;
pub mod render;
pub mod resolve;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
