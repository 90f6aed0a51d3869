//! Per-call routing between the primary and fallback stores.
//!
//! Whether a primary store exists is fixed when the selector is built. When it
//! exists it is always tried first; a failure only affects the call that saw
//! it. Bookings recover from a primary failure through the fallback file.
//! Fleet and settings have no fallback: a failing primary surfaces as
//! [`StoreError::Primary`], a missing one as defaults for reads and
//! [`StoreError::NotInitialized`] for writes.

use std::sync::Arc;

use super::{Collection, FileStore, RecordStore, StoreError};
use crate::models::{default_settings, Fields, Record};

pub struct StoreSelector {
    primary: Option<Arc<dyn RecordStore>>,
    fallback: FileStore,
}

impl StoreSelector {
    pub fn new(primary: Option<Arc<dyn RecordStore>>, fallback: FileStore) -> Self {
        Self { primary, fallback }
    }

    /// Whether a primary store was configured at startup.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    fn primary(&self) -> Result<&dyn RecordStore, StoreError> {
        self.primary.as_deref().ok_or(StoreError::NotInitialized)
    }

    // ------------------------------------------------------------------
    // Bookings
    // ------------------------------------------------------------------

    pub async fn list_bookings(&self) -> Result<Vec<Record>, StoreError> {
        if let Some(primary) = &self.primary {
            match primary.list_all(Collection::Bookings).await {
                Ok(records) => return Ok(records),
                Err(e) => tracing::warn!("Primary store failed listing bookings: {}", e),
            }
        }
        self.fallback.list_all(Collection::Bookings).await
    }

    pub async fn create_booking(&self, fields: Fields) -> Result<Record, StoreError> {
        if let Some(primary) = &self.primary {
            match primary.create(Collection::Bookings, fields.clone()).await {
                Ok(record) => return Ok(record),
                Err(e) => tracing::warn!("Primary store failed creating booking: {}", e),
            }
        }
        self.fallback.create(Collection::Bookings, fields).await
    }

    pub async fn patch_booking(
        &self,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Record>, StoreError> {
        if let Some(primary) = &self.primary {
            match primary.patch(Collection::Bookings, id, fields.clone()).await {
                Ok(record) => return Ok(record),
                Err(e) => tracing::warn!("Primary store failed patching booking {}: {}", id, e),
            }
        }
        self.fallback.patch(Collection::Bookings, id, fields).await
    }

    // ------------------------------------------------------------------
    // Fleet
    // ------------------------------------------------------------------

    pub async fn list_fleet(&self) -> Result<Vec<Record>, StoreError> {
        match &self.primary {
            Some(primary) => primary.list_all(Collection::Fleet).await,
            None => {
                tracing::warn!("Database not initialized, returning empty fleet list");
                Ok(Vec::new())
            }
        }
    }

    pub async fn create_vehicle(&self, fields: Fields) -> Result<Record, StoreError> {
        self.primary()?.create(Collection::Fleet, fields).await
    }

    pub async fn patch_vehicle(
        &self,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Record>, StoreError> {
        self.primary()?.patch(Collection::Fleet, id, fields).await
    }

    pub async fn remove_vehicle(&self, id: &str) -> Result<bool, StoreError> {
        self.primary()?.remove(Collection::Fleet, id).await
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Stored settings, or the defaults if none are stored. Never writes.
    pub async fn read_settings(&self) -> Result<Fields, StoreError> {
        match &self.primary {
            Some(primary) => Ok(primary
                .read_singleton(Collection::Settings)
                .await?
                .unwrap_or_else(default_settings)),
            None => Ok(default_settings()),
        }
    }

    pub async fn merge_settings(&self, fields: Fields) -> Result<Fields, StoreError> {
        self.primary()?
            .merge_singleton(Collection::Settings, fields)
            .await
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Users only live in the primary store; any failure reads as empty.
    pub async fn list_users(&self) -> Vec<Record> {
        let Some(primary) = &self.primary else {
            return Vec::new();
        };
        match primary.list_all(Collection::Users).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!("Primary store failed listing users: {}", e);
                Vec::new()
            }
        }
    }
}
