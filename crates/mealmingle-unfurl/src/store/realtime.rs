//! Firebase Realtime Database backend.
//!
//! Documents are read through the REST API at
//! `{database_url}/{collection}/{id}.json`. A missing path answers `200 null`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::{DocumentStore, StoreError, check_document_id};

/// Characters the Realtime Database does not allow in keys.
const FORBIDDEN_KEY_CHARS: &[char] = &['/', '.', '#', '$', '[', ']'];

/// Realtime Database REST client.
#[derive(Debug, Clone)]
pub struct RealtimeStore {
    client: reqwest::Client,
    database_url: Url,
    auth_token: Option<String>,
}

impl RealtimeStore {
    /// Create a client for the database rooted at `database_url`.
    pub fn new(
        database_url: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let database_url = Url::parse(database_url)
            .map_err(|e| anyhow::anyhow!("invalid FIREBASE_DATABASE_URL '{database_url}': {e}"))?;
        if database_url.cannot_be_a_base() {
            anyhow::bail!("FIREBASE_DATABASE_URL '{database_url}' cannot be used as a base URL");
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            database_url,
            auth_token,
        })
    }

    /// REST URL of one document.
    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        check_document_id(id, FORBIDDEN_KEY_CHARS)?;

        let mut url = self.database_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidId(id.to_string()))?
            .pop_if_empty()
            .push(collection)
            .push(&format!("{id}.json"));

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }

        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for RealtimeStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let url = self.document_url(collection, id)?;

        let resp = self.client.get(url).send().await?;
        match resp.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Ok(None),
            status => {
                return Err(StoreError::Status {
                    backend: self.backend(),
                    status: status.as_u16(),
                });
            }
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(if body.is_null() { None } else { Some(body) })
    }

    fn backend(&self) -> &'static str {
        "realtime"
    }
}
