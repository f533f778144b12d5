//! Generic JSON-document record store.
//!
//! Each collection lives in one pretty-printed JSON array on disk. Every
//! write loads the whole document, mutates it in memory and rewrites the
//! whole document while holding the collection's exclusive lock; reads take
//! the shared lock. There is no cross-collection locking.

use crate::errors::HospitalError;
use crate::observability::{metrics, ErrorCategory};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

/// A record type persisted through a [`JsonStore`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backing document stem, e.g. `patients` for `patients.json`.
    const COLLECTION: &'static str;
    /// Singular name used in client-facing messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Trim input and fill defaults before validation.
    fn normalize(&mut self) {}

    /// Field and natural-key checks. `others` holds every other record of
    /// the collection (the record being updated is excluded).
    fn validate(&self, _others: &[Self]) -> Result<(), HospitalError> {
        Ok(())
    }

    fn on_create(&mut self, _now: DateTime<Utc>) {}

    /// Restore fields that must survive an update (creation timestamps).
    fn on_update(&mut self, _previous: &Self, _now: DateTime<Utc>) {}
}

/// Concurrency-safe collection backed by one JSON document.
pub struct JsonStore<T> {
    path: Arc<PathBuf>,
    lock: Arc<RwLock<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonStore<T> {
    fn clone(&self) -> Self {
        JsonStore {
            path: Arc::clone(&self.path),
            lock: Arc::clone(&self.lock),
            _record: PhantomData,
        }
    }
}

impl<T: Record> JsonStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore {
            path: Arc::new(path.into()),
            lock: Arc::new(RwLock::new(())),
            _record: PhantomData,
        }
    }

    /// Store for `<data_dir>/<COLLECTION>.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(format!("{}.json", T::COLLECTION)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing document as `[]` if it does not exist yet.
    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    pub async fn initialize(&self) -> Result<(), HospitalError> {
        let _guard = self.lock.write().await;

        if tokio::fs::try_exists(self.path.as_path()).await? {
            return Ok(());
        }
        self.persist_locked(&[]).await?;
        tracing::info!(target: "hospital.store", path = %self.path.display(), "Created backing document");
        Ok(())
    }

    /// All records in document order. A missing or blank document is empty.
    pub async fn read_all(&self) -> Result<Vec<T>, HospitalError> {
        let start = Instant::now();
        let result = {
            let _guard = self.lock.read().await;
            self.load_locked().await
        };
        record_outcome(T::COLLECTION, "read_all", &result, start);
        result
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, HospitalError> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|record| record.id() == id))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<T, HospitalError> {
        self.find(id)
            .await?
            .ok_or_else(|| HospitalError::NotFound(format!("{} not found", T::KIND)))
    }

    /// Insert with a fresh id; any caller-supplied id is discarded.
    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    pub async fn create(&self, record: T) -> Result<T, HospitalError> {
        self.mutate("create", move |records| insert_record(records, record, Utc::now()))
            .await
    }

    /// Replace the record with `id`, keeping its creation timestamp.
    #[instrument(skip_all, fields(collection = T::COLLECTION, id = %id))]
    pub async fn update(&self, id: &str, record: T) -> Result<T, HospitalError> {
        self.mutate("update", |records| {
            replace_record(records, id, record, Utc::now())
        })
        .await
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    #[instrument(skip_all, fields(collection = T::COLLECTION, id = %id))]
    pub async fn delete(&self, id: &str) -> Result<bool, HospitalError> {
        self.mutate("delete", |records| {
            let before = records.len();
            records.retain(|record| record.id() != id);
            Ok(records.len() != before)
        })
        .await
    }

    /// Exclusive read-modify-write over the whole collection.
    ///
    /// The document is rewritten only when `op` returns `Ok`.
    pub async fn mutate<R, F>(&self, operation: &'static str, op: F) -> Result<R, HospitalError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, HospitalError>,
    {
        let start = Instant::now();
        let result = async {
            let _guard = self.lock.write().await;
            let mut records = self.load_locked().await?;
            let output = op(&mut records)?;
            self.persist_locked(&records).await?;
            Ok::<R, HospitalError>(output)
        }
        .await;
        record_outcome(T::COLLECTION, operation, &result, start);
        result
    }

    async fn load_locked(&self) -> Result<Vec<T>, HospitalError> {
        let data = match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|e| {
            HospitalError::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn persist_locked(&self, records: &[T]) -> Result<(), HospitalError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|e| {
            HospitalError::Storage(format!("Failed to serialize {}: {}", T::COLLECTION, e))
        })?;
        tokio::fs::write(self.path.as_path(), json).await?;
        Ok(())
    }
}

/// Create step on an already loaded collection: fresh id, normalize,
/// validate against the rest, stamp, append.
pub fn insert_record<T: Record>(
    records: &mut Vec<T>,
    mut record: T,
    now: DateTime<Utc>,
) -> Result<T, HospitalError> {
    record.set_id(Uuid::new_v4().to_string());
    record.normalize();
    record.validate(records)?;
    record.on_create(now);
    records.push(record.clone());
    Ok(record)
}

/// Update step on an already loaded collection.
pub fn replace_record<T: Record>(
    records: &mut [T],
    id: &str,
    mut record: T,
    now: DateTime<Utc>,
) -> Result<T, HospitalError> {
    let index = records
        .iter()
        .position(|existing| existing.id() == id)
        .ok_or_else(|| HospitalError::NotFound(format!("{} not found", T::KIND)))?;

    record.set_id(id.to_string());
    record.normalize();
    let others: Vec<T> = records
        .iter()
        .filter(|existing| existing.id() != id)
        .cloned()
        .collect();
    record.validate(&others)?;

    let slot = records.get_mut(index).ok_or(HospitalError::Internal)?;
    record.on_update(slot, now);
    *slot = record.clone();
    Ok(record)
}

fn record_outcome<R>(
    collection: &str,
    operation: &str,
    result: &Result<R, HospitalError>,
    start: Instant,
) {
    let status = match result {
        Ok(_) => "success",
        Err(e) => {
            tracing::debug!(target: "hospital.store", collection, operation, error = %e, "Store operation failed");
            metrics::record_error(
                operation,
                ErrorCategory::from(e).as_str(),
                e.status_code().as_u16(),
            );
            "error"
        }
    };
    metrics::record_store_operation(collection, operation, status, start.elapsed());
}
