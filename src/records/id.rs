//! Record identifiers.
//!
//! Identifiers follow the document-database object-id layout:
//!
//! ```text
//! | 4 bytes: unix seconds (BE) | 5 bytes: process random | 3 bytes: counter (BE) |
//! ```
//!
//! rendered as 24 lowercase hex characters. The store owns the format; handlers
//! only ever ask the store whether a raw path segment is a valid key.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of an object id in hex characters.
pub const OBJECT_ID_LEN: usize = 24;

/// Opaque, store-assigned record identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a raw key without checking it.
    ///
    /// Callers outside a store should go through `RecordStore::parse_id`.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true when `raw` is exactly 24 hex characters.
pub fn is_object_id(raw: &str) -> bool {
    raw.len() == OBJECT_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Generator for object-id shaped keys.
///
/// One generator per process is enough; ids never repeat because the counter
/// is shared and seeded randomly.
#[derive(Debug)]
pub struct ObjectIdGenerator {
    process: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let mut process = [0u8; 5];
        rng.fill(&mut process);
        Self {
            process,
            counter: AtomicU32::new(rng.gen::<u32>() & 0x00ff_ffff),
        }
    }

    /// Process-wide shared generator.
    pub fn global() -> &'static ObjectIdGenerator {
        static GENERATOR: OnceLock<ObjectIdGenerator> = OnceLock::new();
        GENERATOR.get_or_init(ObjectIdGenerator::new)
    }

    /// Produce the next id stamped with `at`.
    pub fn next_id(&self, at: DateTime<Utc>) -> RecordId {
        let secs = at.timestamp().clamp(0, i64::from(u32::MAX)) as u32;
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

        let hex = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();
        RecordId(hex)
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn accepts_only_24_hex_chars() {
        assert!(is_object_id("65a1f0c2b3d4e5f601234567"));
        assert!(is_object_id("65A1F0C2B3D4E5F601234567"));
        assert!(!is_object_id("65a1f0c2b3d4e5f60123456"));
        assert!(!is_object_id("65a1f0c2b3d4e5f6012345678"));
        assert!(!is_object_id("zza1f0c2b3d4e5f601234567"));
        assert!(!is_object_id("not-an-id"));
        assert!(!is_object_id(""));
    }

    #[test]
    fn generated_ids_are_valid_and_unique() {
        let generator = ObjectIdGenerator::new();
        let now = Utc::now();
        let ids: HashSet<_> = (0..1_000).map(|_| generator.next_id(now)).collect();
        assert_eq!(ids.len(), 1_000);
        assert!(ids.iter().all(|id| is_object_id(id.as_str())));
    }

    #[test]
    fn id_embeds_timestamp() {
        let generator = ObjectIdGenerator::new();
        let at = DateTime::from_timestamp(0x65a1_f0c2, 0).unwrap();
        let id = generator.next_id(at);
        assert!(id.as_str().starts_with("65a1f0c2"));
    }
}
