//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, tracing / request id / CORS / body limit)
//!     → middleware.rs (metrics; record validation on write routes)
//!     → handlers.rs (store calls)
//!     → envelope.rs (uniform success / failure body + status)
//!     → Send to client
//! ```

pub mod envelope;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use envelope::{ApiError, ApiResponse, Envelope};
pub use server::{AppState, HttpServer, X_REQUEST_ID};
