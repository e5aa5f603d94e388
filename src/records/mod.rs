//! Contact record domain.
//!
//! # Data Flow
//! ```text
//! request body bytes
//!     → model.rs (RecordPayload: loosely-typed fields, from JSON or a form)
//!     → validation.rs (all rule violations, or RecordFields)
//!     → store (assigns RecordId + createdAt, yields Record)
//! ```

pub mod id;
pub mod model;
pub mod validation;

pub use id::{is_object_id, ObjectIdGenerator, RecordId};
pub use model::{FormPayload, PayloadError, Record, RecordFields, RecordPayload};
pub use validation::validate_payload;
