//! Read-only access to the backing document store.
//!
//! The resolvers only ever ask for one document by collection and id, so the
//! store surface is a single point lookup. Three backends implement it:
//!
//! - **Memory**: records seeded from a JSON fixture file (local development, tests)
//! - **Realtime**: Firebase Realtime Database REST API
//! - **Firestore**: Cloud Firestore REST API, typed fields decoded to plain JSON

pub mod firestore;
pub mod memory;
pub mod realtime;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{Config, StoreBackend};

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use realtime::RealtimeStore;

/// Errors from a backing store lookup.
///
/// None of these reach the viewer; resolvers log them and treat the
/// record as missing.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure talking to a remote store.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with an unexpected status.
    #[error("{backend} returned status {status}")]
    Status {
        backend: &'static str,
        status: u16,
    },

    /// The document exists but could not be decoded.
    #[error("malformed document: {0}")]
    Decode(String),

    /// The identifier cannot be addressed in this store.
    #[error("invalid identifier '{0}'")]
    InvalidId(String),

    /// The lookup did not finish within the configured bound.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// A read-only document store keyed by collection and document id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. `Ok(None)` means the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Backend name used in logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Build the store selected by the configuration.
pub fn connect(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreBackend::Memory { fixtures_path } => Arc::new(MemoryStore::load(fixtures_path)?),
        StoreBackend::Realtime {
            database_url,
            auth_token,
        } => Arc::new(RealtimeStore::new(
            database_url,
            auth_token.clone(),
            config.lookup_timeout,
        )?),
        StoreBackend::Firestore {
            project_id,
            api_key,
        } => Arc::new(FirestoreStore::new(
            project_id,
            api_key.clone(),
            config.lookup_timeout,
        )?),
    };

    tracing::info!(backend = store.backend(), "document store ready");

    Ok(store)
}

/// Reject ids that would address something other than a single document.
///
/// Both Firebase products forbid `/` in keys; the Realtime Database also
/// forbids `.`, `#`, `$`, `[` and `]`.
pub(crate) fn check_document_id(id: &str, forbidden: &[char]) -> Result<(), StoreError> {
    if id.is_empty() || id.contains(forbidden) {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}
