//! Record persistence.
//!
//! # Data Flow
//! ```text
//! store.uri (config)
//!     → open_store() picks a backend by URI scheme
//!     → Arc<dyn RecordStore> injected into the HTTP state once
//!     → handlers call list/insert/get/replace/delete
//! ```
//!
//! # Backends
//! - `memory://`      in-process concurrent map
//! - `file://<path>`  JSON document file, rewritten after every mutation
//!
//! Anything that cannot be opened is replaced by [`UnavailableStore`] so the
//! process still serves traffic; every store call then fails.

pub mod file;
pub mod memory;
pub mod unavailable;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::records::{Record, RecordFields, RecordId};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use unavailable::UnavailableStore;

/// Errors surfaced by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or was never opened.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The document violates a store-level constraint.
    #[error("Record validation failed: {field}: Path `{field}` is required.")]
    Rejected { field: &'static str },

    #[error("record store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted data could not be decoded.
    #[error("record store data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The connection string is malformed or names an unknown backend.
    #[error("unsupported store uri `{0}`")]
    UnsupportedUri(String),
}

/// Persistence boundary for records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Whether `raw` is a well-formed key for this store.
    fn is_valid_id(&self, raw: &str) -> bool;

    /// Canonical key for `raw`. Hex digits are case-insensitive, keys are
    /// stored lowercase.
    fn parse_id(&self, raw: &str) -> Option<RecordId> {
        self.is_valid_id(raw)
            .then(|| RecordId::new_unchecked(raw.to_ascii_lowercase()))
    }

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<Record>, StoreError>;

    /// Persist a new record, assigning its id and creation time.
    async fn insert(&self, fields: RecordFields) -> Result<Record, StoreError>;

    async fn get(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;

    /// Replace all mutable fields, returning the updated record.
    async fn replace(
        &self,
        id: &RecordId,
        fields: RecordFields,
    ) -> Result<Option<Record>, StoreError>;

    /// Remove a record, returning what was removed.
    async fn delete(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;
}

/// Open the backend named by `uri`.
pub async fn open_store(uri: &str) -> Result<Arc<dyn RecordStore>, StoreError> {
    let parsed = Url::parse(uri).map_err(|_| StoreError::UnsupportedUri(uri.to_string()))?;
    match parsed.scheme() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "file" => {
            let path = file_path(&parsed).ok_or_else(|| StoreError::UnsupportedUri(uri.to_string()))?;
            Ok(Arc::new(FileStore::open(path).await?))
        }
        _ => Err(StoreError::UnsupportedUri(uri.to_string())),
    }
}

/// Open the configured store, degrading to [`UnavailableStore`] on failure.
pub async fn connect_or_degrade(uri: &str) -> Arc<dyn RecordStore> {
    match open_store(uri).await {
        Ok(store) => {
            tracing::info!(backend = store.backend_tag(), "Connected to record store");
            store
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not connect to record store");
            tracing::error!("Check the store connection string (STORE_URI / MONGODB_URI)");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

// `file:///abs/path` or `file://relative/path`.
fn file_path(url: &Url) -> Option<std::path::PathBuf> {
    match url.host_str() {
        None | Some("") => url.to_file_path().ok(),
        Some(host) => Some(std::path::Path::new(host).join(url.path().trim_start_matches('/'))),
    }
}

/// Store-side required-field check.
pub(crate) fn check_required(fields: &RecordFields) -> Result<(), StoreError> {
    match fields.first_empty() {
        Some(field) => Err(StoreError::Rejected { field }),
        None => Ok(()),
    }
}

/// A record paired with the store's insertion sequence number.
pub(crate) type Sequenced = (u64, Record);

/// Order records newest first; equal timestamps fall back to insertion order.
pub(crate) fn newest_first(mut entries: Vec<Sequenced>) -> Vec<Record> {
    entries.sort_by(|(a_seq, a), (b_seq, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b_seq.cmp(a_seq))
    });
    entries.into_iter().map(|(_, record)| record).collect()
}
