//! Async client for the contact-records REST API.

mod client;

pub use client::{ApiReply, EnvelopeView, RecordInput, RecordView, RecordsClient};
