//! Primary store backed by the Firebase Realtime Database REST API.
//!
//! Each collection is a node under the database root:
//! ```text
//! <database_url>/
//!   bookings/<push key> -> { customer, photos, status, createdAt, ... }
//!   fleet/<push key>    -> { ..., createdAt }
//!   settings            -> { registration, maintenance, invoicing, ... }
//!   users/<key>         -> { ... }
//! ```
//!
//! Stored values never embed their identifier; it is the node key and is
//! attached again when records are materialized.
//!
//! Requests authenticate with a bearer token obtained from a service account
//! key or, for legacy setups, with a database secret in the `auth` query
//! parameter.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::token::TokenSource;
use super::{Collection, RecordStore, StoreError};
use crate::config::{Credentials, DatabaseAuth};
use crate::models::{Fields, Record};

/// Response body of a push (`POST`) request.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

#[derive(Debug, Clone)]
enum Auth {
    Anonymous,
    Secret(String),
    Bearer(Arc<TokenSource>),
}

#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: reqwest::Client,
    database_url: String,
    auth: Auth,
}

impl FirebaseStore {
    /// Fails only if a service account key cannot be used for signing.
    pub fn new(credentials: &Credentials) -> Result<Self, StoreError> {
        let client = reqwest::Client::new();
        let auth = match &credentials.auth {
            DatabaseAuth::Anonymous => Auth::Anonymous,
            DatabaseAuth::Secret(secret) => Auth::Secret(secret.clone()),
            DatabaseAuth::ServiceAccount(key) => {
                Auth::Bearer(Arc::new(TokenSource::new(client.clone(), key)?))
            }
        };

        Ok(Self {
            client,
            database_url: credentials.database_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Returns the REST URL of a node.
    fn node_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.database_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StoreError> {
        let builder = self.client.request(method, self.node_url(path));
        Ok(match &self.auth {
            Auth::Anonymous => builder,
            Auth::Secret(secret) => builder.query(&[("auth", secret)]),
            Auth::Bearer(tokens) => builder.bearer_auth(tokens.access_token().await?),
        })
    }

    /// Sends a request and decodes the JSON response body.
    async fn send(&self, builder: RequestBuilder) -> Result<Value, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Primary(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Primary(format!(
                "Database returned status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Primary(e.to_string()))
    }

    async fn fetch(&self, path: &str) -> Result<Value, StoreError> {
        self.send(self.request(Method::GET, path).await?).await
    }

    /// Keys may not be empty or contain path or reserved characters.
    fn is_valid_key(id: &str) -> bool {
        !id.is_empty() && !id.contains(['/', '.', '#', '$', '[', ']'])
    }

    /// Rebuilds records by zipping each child key with its value.
    fn records_from(value: Value) -> Vec<Record> {
        match value {
            Value::Object(children) => children
                .into_iter()
                .map(|(key, child)| Record::new(key, Self::fields_from(child)))
                .collect(),
            // Children with integer keys come back as a sparse array.
            Value::Array(children) => children
                .into_iter()
                .enumerate()
                .filter(|(_, child)| !child.is_null())
                .map(|(index, child)| Record::new(index.to_string(), Self::fields_from(child)))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn fields_from(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        }
    }
}

#[async_trait]
impl RecordStore for FirebaseStore {
    async fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let value = self.fetch(collection.name()).await?;
        Ok(Self::records_from(value))
    }

    async fn create(
        &self,
        collection: Collection,
        mut fields: Fields,
    ) -> Result<Record, StoreError> {
        fields.remove("id");
        let value = self
            .send(self.request(Method::POST, collection.name()).await?.json(&fields))
            .await?;
        let pushed: PushResponse = serde_json::from_value(value)?;

        Ok(Record::new(pushed.name, fields))
    }

    /// Existence check, then server-side merge, then a re-read for the
    /// canonical record. Not atomic with respect to concurrent patches of the
    /// same record.
    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        mut fields: Fields,
    ) -> Result<Option<Record>, StoreError> {
        if !Self::is_valid_key(id) {
            return Ok(None);
        }
        let path = format!("{}/{}", collection.name(), id);
        if self.fetch(&path).await?.is_null() {
            return Ok(None);
        }

        fields.remove("id");
        self.send(self.request(Method::PATCH, &path).await?.json(&fields))
            .await?;

        let merged = self.fetch(&path).await?;
        Ok(Some(Record::new(id, Self::fields_from(merged))))
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        if !Self::is_valid_key(id) {
            return Ok(false);
        }
        let path = format!("{}/{}", collection.name(), id);
        if self.fetch(&path).await?.is_null() {
            return Ok(false);
        }

        self.send(self.request(Method::DELETE, &path).await?).await?;
        Ok(true)
    }

    async fn read_singleton(&self, collection: Collection) -> Result<Option<Fields>, StoreError> {
        match self.fetch(collection.name()).await? {
            Value::Object(fields) => Ok(Some(fields)),
            _ => Ok(None),
        }
    }

    async fn merge_singleton(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<Fields, StoreError> {
        let request = self.request(Method::PATCH, collection.name()).await?;
        self.send(request.json(&fields)).await?;
        let merged = self.fetch(collection.name()).await?;
        Ok(Self::fields_from(merged))
    }
}
