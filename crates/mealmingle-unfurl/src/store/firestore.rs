//! Cloud Firestore backend.
//!
//! Reads `projects/{project}/databases/(default)/documents/{collection}/{id}`
//! through the REST API. Firestore wraps every field in a typed envelope
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...); [`decode_fields`]
//! flattens those into the same plain JSON the other backends return, so the
//! resolvers never see the difference.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};

use super::{DocumentStore, StoreError, check_document_id};

const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1/";

/// Firestore REST client for one project's default database.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: Url,
    api_key: Option<String>,
}

impl FirestoreStore {
    pub fn new(
        project_id: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        if project_id.is_empty() || project_id.contains('/') {
            anyhow::bail!("invalid FIREBASE_PROJECT_ID '{project_id}'");
        }

        let mut documents_url = Url::parse(FIRESTORE_ENDPOINT)?;
        documents_url
            .path_segments_mut()
            .map_err(|()| anyhow::anyhow!("firestore endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["projects", project_id, "databases", "(default)", "documents"]);

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            documents_url,
            api_key,
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        check_document_id(id, &['/'])?;
        if id == "." || id == ".." {
            return Err(StoreError::InvalidId(id.to_string()));
        }

        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidId(id.to_string()))?
            .push(collection)
            .push(id);

        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
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

        let document: Value = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        // A document with no fields has no "fields" key at all.
        let fields = match document.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields),
            Some(other) => {
                return Err(StoreError::Decode(format!(
                    "expected an object for document fields, got {other}"
                )));
            }
            None => Map::new(),
        };

        Ok(Some(Value::Object(fields)))
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}

/// Flatten a Firestore `fields` map into plain JSON.
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, typed)| (name.clone(), decode_value(typed)))
        .collect()
}

/// Flatten one typed Firestore value.
///
/// Unknown or malformed envelopes decode to `null`, which the resolvers treat
/// as an absent field.
pub fn decode_value(typed: &Value) -> Value {
    let Some(envelope) = typed.as_object() else {
        return Value::Null;
    };
    let Some((tag, inner)) = envelope.iter().next() else {
        return Value::Null;
    };

    match tag.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.as_bool().map_or(Value::Null, Value::Bool),
        // 64-bit integers arrive as decimal strings.
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map_or(Value::Null, Value::from),
            Value::Number(_) => inner.clone(),
            _ => Value::Null,
        },
        "doubleValue" => match inner {
            Value::Number(_) => inner.clone(),
            // NaN and the infinities are sent as strings and have no JSON form.
            _ => Value::Null,
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => match inner {
            Value::String(_) => inner.clone(),
            _ => Value::Null,
        },
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default();
            Value::Array(values)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default();
            Value::Object(fields)
        }
        _ => Value::Null,
    }
}
