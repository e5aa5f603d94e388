//! Contact Records Service Library

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod records;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use records::{Record, RecordFields, RecordId};
pub use store::{RecordStore, StoreError};
