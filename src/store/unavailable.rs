//! Stand-in store used when the configured backend could not be opened.

use async_trait::async_trait;

use crate::records::{is_object_id, Record, RecordFields, RecordId};
use crate::store::{RecordStore, StoreError};

#[derive(Debug)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl RecordStore for UnavailableStore {
    fn backend_tag(&self) -> &'static str {
        "unavailable"
    }

    // Id checks stay local so malformed ids still get a 400.
    fn is_valid_id(&self, raw: &str) -> bool {
        is_object_id(raw)
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        Err(self.error())
    }

    async fn insert(&self, _fields: RecordFields) -> Result<Record, StoreError> {
        Err(self.error())
    }

    async fn get(&self, _id: &RecordId) -> Result<Option<Record>, StoreError> {
        Err(self.error())
    }

    async fn replace(
        &self,
        _id: &RecordId,
        _fields: RecordFields,
    ) -> Result<Option<Record>, StoreError> {
        Err(self.error())
    }

    async fn delete(&self, _id: &RecordId) -> Result<Option<Record>, StoreError> {
        Err(self.error())
    }
}
