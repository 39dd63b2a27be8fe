//! In-process document store seeded from JSON.
//!
//! The fixture format mirrors a Realtime Database export:
//!
//! ```json
//! {
//!   "recipes": { "recipe123": { "title": "Chicken Tikka Masala" } },
//!   "invitations": { "abc123": { "inviterName": "Sarah Johnson" } }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentStore, StoreError};

/// Collections of documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, HashMap<String, Value>>,
}

impl MemoryStore {
    /// An empty store: every lookup reports the document as missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let collections = serde_json::from_str(json)?;
        Ok(Self { collections })
    }

    /// Load a fixture file from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures from {}", path.display()))?;
        let store = Self::from_json_str(&json)
            .with_context(|| format!("failed to parse fixtures in {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            collections = store.collections.len(),
            documents = store.len(),
            "fixtures loaded"
        );

        Ok(store)
    }

    /// Add or replace a document.
    pub fn insert(&mut self, collection: &str, id: &str, document: Value) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, collection: &str, id: &str, document: Value) -> Self {
        self.insert(collection, id, document);
        self
    }

    /// Total number of documents across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let document = self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .filter(|doc| !doc.is_null())
            .cloned();
        Ok(document)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
