//! In-memory record store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::records::{is_object_id, ObjectIdGenerator, Record, RecordFields, RecordId};
use crate::store::{check_required, newest_first, RecordStore, Sequenced, StoreError};

/// Concurrent map keyed by record id. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<RecordId, Sequenced>,
    sequence: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    fn is_valid_id(&self, raw: &str) -> bool {
        is_object_id(raw)
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let entries = self.records.iter().map(|e| e.value().clone()).collect();
        Ok(newest_first(entries))
    }

    async fn insert(&self, fields: RecordFields) -> Result<Record, StoreError> {
        check_required(&fields)?;
        let created_at = Utc::now();
        let record = Record {
            id: ObjectIdGenerator::global().next_id(created_at),
            name: fields.name,
            email: fields.email,
            phone_number: fields.phone_number,
            created_at,
        };
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.records.insert(record.id.clone(), (seq, record.clone()));
        Ok(record)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.records.get(id).map(|e| e.value().1.clone()))
    }

    async fn replace(
        &self,
        id: &RecordId,
        fields: RecordFields,
    ) -> Result<Option<Record>, StoreError> {
        check_required(&fields)?;
        Ok(self.records.get_mut(id).map(|mut entry| {
            let (_, record) = entry.value_mut();
            record.apply(fields);
            record.clone()
        }))
    }

    async fn delete(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.records.remove(id).map(|(_, (_, record))| record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> RecordFields {
        RecordFields::new(name, "ada@example.com", "12345")
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let record = store.insert(fields("Ada")).await.unwrap();
        assert!(store.is_valid_id(record.id.as_str()));
        assert!(record.created_at >= before);
        assert_eq!(store.get(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert(fields("First")).await.unwrap();
        let second = store.insert(fields("Second")).await.unwrap();
        let third = store.insert(fields("Third")).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn replace_keeps_list_position() {
        let store = MemoryStore::new();
        let first = store.insert(fields("First")).await.unwrap();
        let second = store.insert(fields("Second")).await.unwrap();
        store.replace(&first.id, fields("Renamed")).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn replace_keeps_identity() {
        let store = MemoryStore::new();
        let record = store.insert(fields("Ada")).await.unwrap();
        let updated = store
            .replace(&record.id, RecordFields::new("Grace", "grace@example.com", "67890"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.created_at, record.created_at);
        assert_eq!(updated.name, "Grace");
    }

    #[tokio::test]
    async fn missing_ids_yield_none() {
        let store = MemoryStore::new();
        let id = RecordId::new_unchecked("000000000000000000000000");
        assert_eq!(store.get(&id).await.unwrap(), None);
        assert_eq!(store.replace(&id, fields("Ada")).await.unwrap(), None);
        assert_eq!(store.delete(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let store = MemoryStore::new();
        let record = store.insert(fields("Ada")).await.unwrap();
        assert_eq!(store.delete(&record.id).await.unwrap(), Some(record.clone()));
        assert_eq!(store.delete(&record.id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn empty_required_field_is_rejected() {
        let store = MemoryStore::new();
        let err = store.insert(RecordFields::new("", "a@b.co", "12345")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { field: "name" }));
        assert_eq!(store.len(), 0);
    }
}
