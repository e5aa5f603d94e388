//! End-to-end tests for the record endpoints.

use records_sdk::RecordInput;

mod common;

const UNKNOWN_ID: &str = "0123456789abcdef01234567";

#[tokio::test]
async fn test_liveness_probe() {
    let server = common::start_server(false).await;
    let reply = server.client.ping().await.unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.body.success);
    assert!(reply.body.timestamp.is_some());
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let server = common::start_server(false).await;
    let reply = server.client.list().await.unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.body.success);
    assert_eq!(reply.body.count, Some(0));
    assert_eq!(reply.body.records(), Some(Vec::new()));
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let server = common::start_server(true).await;
    let input = RecordInput::new("Ada Lovelace", "ada@example.com", "555-0100");

    let created = server.client.create(&input).await.unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.body.message.as_deref(), Some("Record created successfully"));
    let record = created.body.record().unwrap();
    assert!(!record.id.is_empty());
    assert!(!record.created_at.is_empty());

    let fetched = server.client.get(&record.id).await.unwrap();
    assert_eq!(fetched.status, 200);
    let fetched = fetched.body.record().unwrap();
    assert_eq!(fetched, record);
    assert_eq!(fetched.name, "Ada Lovelace");
    assert_eq!(fetched.email, "ada@example.com");
    assert_eq!(fetched.phone_number, "555-0100");
}

#[tokio::test]
async fn test_unvalidated_create_uses_placeholders() {
    let server = common::start_server(false).await;
    let input = RecordInput {
        name: Some("A".into()),
        ..RecordInput::default()
    };

    let reply = server.client.create(&input).await.unwrap();
    assert_eq!(reply.status, 201);
    let record = reply.body.record().unwrap();
    assert_eq!(record.name, "A");
    assert_eq!(record.email, "default@example.com");
    assert_eq!(record.phone_number, "0000000000");
}

#[tokio::test]
async fn test_create_rejects_empty_body() {
    let server = common::start_server(false).await;
    for body in ["{}", "", "{oops"] {
        let reply = server.client.create_raw(body).await.unwrap();
        assert_eq!(reply.status, 400, "body {body:?}");
        assert!(!reply.body.success);
        assert_eq!(
            reply.body.message.as_deref(),
            Some("Empty request body or invalid JSON format")
        );
    }
}

#[tokio::test]
async fn test_validated_create_collects_all_errors() {
    let server = common::start_server(true).await;
    let reply = server.client.create(&RecordInput::new("A", "bad", "123")).await.unwrap();
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body.message.as_deref(), Some("Validation failed"));
    assert_eq!(
        reply.body.errors.unwrap(),
        vec![
            "Name must be at least 2 characters long",
            "Invalid email format",
            "Phone number must be at least 5 characters",
        ]
    );
    assert_eq!(server.client.list().await.unwrap().body.count, Some(0));
}

#[tokio::test]
async fn test_update_then_fetch() {
    let server = common::start_server(false).await;
    let original = server
        .client
        .create(&RecordInput::new("Grace", "grace@example.com", "12345"))
        .await
        .unwrap()
        .body
        .record()
        .unwrap();

    let reply = server
        .client
        .update(&original.id, &RecordInput::new("Grace", "hopper@navy.mil", "12345"))
        .await
        .unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body.message.as_deref(), Some("Record updated successfully"));
    assert_eq!(reply.body.record().unwrap().email, "hopper@navy.mil");

    let fetched = server.client.get(&original.id).await.unwrap().body.record().unwrap();
    assert_eq!(fetched.email, "hopper@navy.mil");
    assert_eq!(fetched.id, original.id);
    assert_eq!(fetched.created_at, original.created_at);
}

#[tokio::test]
async fn test_update_requires_every_field() {
    let server = common::start_server(false).await;
    let record = server
        .client
        .create(&RecordInput::new("Grace", "grace@example.com", "12345"))
        .await
        .unwrap()
        .body
        .record()
        .unwrap();

    let partial = RecordInput {
        email: Some("new@example.com".into()),
        ..RecordInput::default()
    };
    let reply = server.client.update(&record.id, &partial).await.unwrap();
    assert_eq!(reply.status, 400);
    assert_eq!(
        reply.body.errors.unwrap(),
        vec!["Name is required", "Phone number is required"]
    );

    let unchanged = server.client.get(&record.id).await.unwrap().body.record().unwrap();
    assert_eq!(unchanged, record);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let server = common::start_server(false).await;
    let reply = server
        .client
        .update(UNKNOWN_ID, &RecordInput::new("Grace", "grace@example.com", "12345"))
        .await
        .unwrap();
    assert_eq!(reply.status, 404);
    assert_eq!(reply.body.message.as_deref(), Some("Record not found"));
}

#[tokio::test]
async fn test_delete_then_fetch() {
    let server = common::start_server(false).await;
    let record = server
        .client
        .create(&RecordInput::new("Alan", "alan@example.com", "12345"))
        .await
        .unwrap()
        .body
        .record()
        .unwrap();

    let deleted = server.client.delete(&record.id).await.unwrap();
    assert_eq!(deleted.status, 200);
    assert_eq!(deleted.body.message.as_deref(), Some("Record deleted successfully"));
    assert!(deleted.body.data.is_none());

    let fetched = server.client.get(&record.id).await.unwrap();
    assert_eq!(fetched.status, 404);

    let again = server.client.delete(&record.id).await.unwrap();
    assert_eq!(again.status, 404);
    assert!(!again.body.success);
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let server = common::start_server(false).await;
    let valid = RecordInput::new("Alan", "alan@example.com", "12345");
    for id in ["123", "zzzzzzzzzzzzzzzzzzzzzzzz", "0123456789abcdef012345678"] {
        for reply in [
            server.client.get(id).await.unwrap(),
            server.client.update(id, &valid).await.unwrap(),
            server.client.delete(id).await.unwrap(),
        ] {
            assert_eq!(reply.status, 400, "id {id}");
            assert_eq!(reply.body.message.as_deref(), Some("Invalid ID format"));
        }
    }
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let server = common::start_server(false).await;
    let mut ids = Vec::new();
    for name in ["First", "Second", "Third"] {
        let record = server
            .client
            .create(&RecordInput::new(name, "x@example.com", "12345"))
            .await
            .unwrap()
            .body
            .record()
            .unwrap();
        ids.push(record.id);
    }
    ids.reverse();

    let reply = server.client.list().await.unwrap();
    assert_eq!(reply.body.count, Some(3));
    let listed: Vec<_> = reply.body.records().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_cors_headers_on_every_response() {
    let server = common::start_server(false).await;
    let res = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(format!("{}/api/records/123", server.base_url))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}
