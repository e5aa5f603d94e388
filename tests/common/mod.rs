//! Shared utilities for integration testing.

use std::sync::Arc;

use contact_records::config::ServiceConfig;
use contact_records::store::{MemoryStore, RecordStore};
use contact_records::{HttpServer, Shutdown};
use records_sdk::RecordsClient;
use tokio::net::TcpListener;

/// A running server on an ephemeral port.
pub struct TestServer {
    pub client: RecordsClient,
    #[allow(dead_code)]
    pub base_url: String,
    shutdown: Shutdown,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server over a fresh in-memory store.
pub async fn start_server(validate_on_create: bool) -> TestServer {
    let mut config = ServiceConfig::default();
    config.records.validate_on_create = validate_on_create;
    start_server_with(config, Arc::new(MemoryStore::new())).await
}

/// Start a server with an explicit config and store.
#[allow(dead_code)]
pub async fn start_server_with(
    mut config: ServiceConfig,
    store: Arc<dyn RecordStore>,
) -> TestServer {
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;

    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        client: RecordsClient::new(&base_url),
        base_url,
        shutdown,
    }
}
