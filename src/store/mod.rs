//! Record persistence.
//!
//! Every backing store implements [`RecordStore`] for the collections it can
//! hold. Two implementations exist:
//!
//! - [`FirebaseStore`]: the remote Realtime Database, constructed only when
//!   credentials were found at startup.
//! - [`FileStore`]: a single local JSON file, used for bookings when the
//!   primary store is absent or failing.
//!
//! [`StoreSelector`] decides which one serves a given call.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::models::{Fields, Record};

pub mod file;
pub mod firebase;
pub mod selector;
pub mod token;

pub use file::FileStore;
pub use firebase::FirebaseStore;
pub use selector::StoreSelector;

/// Record collections known to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Bookings,
    Fleet,
    Settings,
    Users,
}

impl Collection {
    /// Key space (path segment) of this collection in a store.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Bookings => "bookings",
            Collection::Fleet => "fleet",
            Collection::Settings => "settings",
            Collection::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by a store or by the selector on its behalf.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No store exists for this collection.
    #[error("Database not initialized")]
    NotInitialized,
    /// The store exists but does not implement this operation for the collection.
    #[error("{collection} does not support {operation}")]
    Unsupported {
        collection: Collection,
        operation: &'static str,
    },
    /// The primary store could not be reached or rejected the request.
    #[error("Primary store error: {0}")]
    Primary(String),
    /// No access token could be obtained for the primary store.
    #[error("Primary store authentication failed: {0}")]
    Auth(String),
    /// I/O error on a local store file.
    #[error("I/O error for {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Read/write contract for a backing store.
///
/// Calls are never retried by the store itself. `patch` and `remove` report an
/// unknown identifier as `Ok(None)` / `Ok(false)` rather than as an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every record of a keyed collection.
    async fn list_all(&self, collection: Collection) -> Result<Vec<Record>, StoreError>;

    /// Stores a new record and returns it with its assigned identifier.
    async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, StoreError>;

    /// Shallow-merges `fields` into an existing record and returns the merged record.
    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Record>, StoreError>;

    /// Deletes a record. Returns `false` if it did not exist.
    async fn remove(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let _ = id;
        Err(StoreError::Unsupported {
            collection,
            operation: "remove",
        })
    }

    /// Reads a singleton collection. `None` if nothing was stored yet.
    async fn read_singleton(&self, collection: Collection) -> Result<Option<Fields>, StoreError> {
        Err(StoreError::Unsupported {
            collection,
            operation: "read",
        })
    }

    /// Shallow-merges into a singleton collection and returns the stored result.
    async fn merge_singleton(
        &self,
        collection: Collection,
        fields: Fields,
    ) -> Result<Fields, StoreError> {
        let _ = fields;
        Err(StoreError::Unsupported {
            collection,
            operation: "merge",
        })
    }
}
