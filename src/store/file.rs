//! JSON file-backed record store.
//!
//! The whole collection lives in memory and is written back after every
//! mutation: serialize to `<path>.tmp`, then rename over `<path>`. A crash
//! mid-write leaves the previous file intact.
//!
//! The file lists records in insertion order, which is how list ties are
//! broken after a reopen.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::records::{is_object_id, ObjectIdGenerator, Record, RecordFields, RecordId};
use crate::store::{check_required, newest_first, RecordStore, Sequenced, StoreError};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: RwLock<HashMap<RecordId, Sequenced>>,
    sequence: AtomicU64,
}

impl FileStore {
    /// Load `path`, creating an empty collection if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice::<Vec<Record>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), records = records.len(), "Loaded record file");

        let sequence = AtomicU64::new(records.len() as u64);
        let records = records
            .into_iter()
            .enumerate()
            .map(|(seq, r)| (r.id.clone(), (seq as u64, r)))
            .collect();

        Ok(Self {
            path,
            records: RwLock::new(records),
            sequence,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Caller holds the write lock so snapshots are written in mutation order.
    async fn persist(&self, records: &HashMap<RecordId, Sequenced>) -> Result<(), StoreError> {
        let mut snapshot: Vec<&Sequenced> = records.values().collect();
        snapshot.sort_by_key(|(seq, _)| *seq);
        let snapshot: Vec<&Record> = snapshot.into_iter().map(|(_, record)| record).collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    fn backend_tag(&self) -> &'static str {
        "file"
    }

    fn is_valid_id(&self, raw: &str) -> bool {
        is_object_id(raw)
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let entries = self.records.read().await.values().cloned().collect();
        Ok(newest_first(entries))
    }

    async fn insert(&self, fields: RecordFields) -> Result<Record, StoreError> {
        check_required(&fields)?;
        let mut records = self.records.write().await;
        let created_at = Utc::now();
        let record = Record {
            id: ObjectIdGenerator::global().next_id(created_at),
            name: fields.name,
            email: fields.email,
            phone_number: fields.phone_number,
            created_at,
        };
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        records.insert(record.id.clone(), (seq, record.clone()));
        if let Err(e) = self.persist(&records).await {
            records.remove(&record.id);
            return Err(e);
        }
        Ok(record)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.records.read().await.get(id).map(|(_, record)| record.clone()))
    }

    async fn replace(
        &self,
        id: &RecordId,
        fields: RecordFields,
    ) -> Result<Option<Record>, StoreError> {
        check_required(&fields)?;
        let mut records = self.records.write().await;
        let Some((seq, previous)) = records.get(id).cloned() else {
            return Ok(None);
        };
        let mut updated = previous.clone();
        updated.apply(fields);
        records.insert(id.clone(), (seq, updated.clone()));
        if let Err(e) = self.persist(&records).await {
            records.insert(id.clone(), (seq, previous));
            return Err(e);
        }
        Ok(Some(updated))
    }

    async fn delete(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let mut records = self.records.write().await;
        let Some(removed) = records.remove(id) else {
            return Ok(None);
        };
        if let Err(e) = self.persist(&records).await {
            records.insert(id.clone(), removed);
            return Err(e);
        }
        Ok(Some(removed.1))
    }
}
