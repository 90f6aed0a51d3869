//! Shared test doubles and helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use packigo::models::{Fields, Record};
use packigo::server::AppState;
use packigo::store::{Collection, FileStore, RecordStore, StoreError, StoreSelector};

/// Reachable primary store kept in memory.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, BTreeMap<String, Fields>>>,
    singletons: Mutex<HashMap<Collection, Fields>>,
    next_key: AtomicUsize,
}

impl MemoryStore {
    pub fn settings(&self) -> Option<Fields> {
        self.singletons
            .lock()
            .unwrap()
            .get(&Collection::Settings)
            .cloned()
    }

    pub fn insert(&self, collection: Collection, id: &str, fields: Fields) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .insert(id.to_string(), fields);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, StoreError> {
        let key = format!("-Nmem{:04}", self.next_key.fetch_add(1, Ordering::SeqCst));
        let record = Record::new(key, fields);
        self.insert(collection, &record.id, record.fields.clone());
        Ok(record)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Record>, StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let Some(stored) = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(id))
        else {
            return Ok(None);
        };
        stored.extend(fields);
        Ok(Some(Record::new(id, stored.clone())))
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.lock().unwrap();
        Ok(collections
            .get_mut(&collection)
            .and_then(|records| records.remove(id))
            .is_some())
    }

    async fn read_singleton(&self, collection: Collection) -> Result<Option<Fields>, StoreError> {
        Ok(self.singletons.lock().unwrap().get(&collection).cloned())
    }

    async fn merge_singleton(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<Fields, StoreError> {
        let mut singletons = self.singletons.lock().unwrap();
        let stored = singletons.entry(collection).or_default();
        stored.extend(fields);
        Ok(stored.clone())
    }
}

/// Configured primary store whose every call fails.
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    fn fail(&self) -> StoreError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StoreError::Primary("connection reset".to_string())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn list_all(&self, _: Collection) -> Result<Vec<Record>, StoreError> {
        Err(self.fail())
    }

    async fn create(&self, _: Collection, _: Fields) -> Result<Record, StoreError> {
        Err(self.fail())
    }

    async fn patch(&self, _: Collection, _: &str, _: Fields) -> Result<Option<Record>, StoreError> {
        Err(self.fail())
    }

    async fn remove(&self, _: Collection, _: &str) -> Result<bool, StoreError> {
        Err(self.fail())
    }

    async fn read_singleton(&self, _: Collection) -> Result<Option<Fields>, StoreError> {
        Err(self.fail())
    }

    async fn merge_singleton(&self, _: Collection, _: Fields) -> Result<Fields, StoreError> {
        Err(self.fail())
    }
}

/// A running application over a temporary bookings file.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub temp: TempDir,
}

impl TestApp {
    pub fn new(primary: Option<Arc<dyn RecordStore>>) -> Self {
        let temp = TempDir::new().unwrap();
        let fallback = FileStore::new(temp.path().join("bookings.json"));
        let state = AppState::new(StoreSelector::new(primary, fallback));
        let router = packigo::server::router(state.clone(), None);
        Self {
            state,
            router,
            temp,
        }
    }

    /// No credentials: bookings on the file, fleet and settings unavailable.
    pub fn local() -> Self {
        Self::new(None)
    }

    pub fn with_primary<S: RecordStore + 'static>(store: Arc<S>) -> Self {
        Self::new(Some(store as Arc<dyn RecordStore>))
    }

    pub fn bookings_file(&self) -> std::path::PathBuf {
        self.temp.path().join("bookings.json")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}
