//! Exercises the database client over an in-memory transport: the auth
//! handshake, subscription routing, and awaitable writes.

mod common;

use common::{ack_next_write, channel_transport, start_client};
use lobby_client::client::{DbChange, DbClient, DbError, DbEvent};
use lobby_core::path::DbPath;
use lobby_core::protocol::{ClientMessage, ServerMessage};
use serde_json::json;

// ============ Handshake ============

#[tokio::test]
async fn handshake_fails_when_the_service_rejects() {
    let (transport, service) = channel_transport();
    service.push(&ServerMessage::Error {
        message: "unknown user".to_string(),
    });

    let err = DbClient::start(transport, "alice")
        .await
        .err()
        .expect("handshake should fail");
    assert!(matches!(err, DbError::Auth(m) if m == "unknown user"));
}

#[tokio::test]
async fn handshake_fails_when_the_service_hangs_up() {
    let (transport, service) = channel_transport();
    service.disconnect();

    let err = DbClient::start(transport, "alice")
        .await
        .err()
        .expect("handshake should fail");
    assert!(matches!(err, DbError::Disconnected));
}

// ============ Subscriptions ============

#[tokio::test]
async fn subscribing_delivers_snapshots() {
    let (client, mut events, mut service) = start_client("alice").await;

    let _guard = client.subscribe(DbPath::games());
    match service.sent().await {
        ClientMessage::Subscribe { path } => assert_eq!(path, "/games"),
        other => panic!("expected Subscribe, got {other:?}"),
    }

    let value = json!({ "g1": { "host": "bob" } });
    service.push(&ServerMessage::Snapshot {
        path: "/games".to_string(),
        value: value.clone(),
    });

    let event = events.recv().await.expect("event stream open");
    assert_eq!(
        event,
        DbEvent::Change {
            path: DbPath::games(),
            change: DbChange::Value(value),
        }
    );
}

#[tokio::test]
async fn dropping_the_guard_releases_the_subscription() {
    let (client, mut events, mut service) = start_client("alice").await;

    let guard = client.subscribe(DbPath::game("g1"));
    assert!(matches!(service.sent().await, ClientMessage::Subscribe { .. }));

    drop(guard);
    match service.sent().await {
        ClientMessage::Unsubscribe { path } => assert_eq!(path, "/games/g1"),
        other => panic!("expected Unsubscribe, got {other:?}"),
    }

    // A late delivery for the released path must never come through.
    service.push(&ServerMessage::Snapshot {
        path: "/games/g1".to_string(),
        value: json!({ "host": "bob" }),
    });
    service.push(&ServerMessage::Error {
        message: "marker".to_string(),
    });
    assert_eq!(
        events.recv().await,
        Some(DbEvent::ServiceError {
            message: "marker".to_string(),
        })
    );
}

#[tokio::test]
async fn subscriptions_are_refcounted_per_path() {
    let (client, _events, mut service) = start_client("alice").await;

    let first = client.subscribe(DbPath::game("g1"));
    let second = client.subscribe(DbPath::game("g1"));
    assert!(matches!(service.sent().await, ClientMessage::Subscribe { .. }));

    // Dropping one of two guards must not release the wire subscription.
    drop(first);
    ack_next_write(&client, &mut service).await;
    assert!(service.try_sent().is_none());

    drop(second);
    match service.sent().await {
        ClientMessage::Unsubscribe { path } => assert_eq!(path, "/games/g1"),
        other => panic!("expected Unsubscribe, got {other:?}"),
    }
}

#[tokio::test]
async fn garbage_frames_are_skipped() {
    let (client, mut events, mut service) = start_client("alice").await;

    let _guard = client.subscribe(DbPath::games());
    let _ = service.sent().await;

    service.push_raw("not json at all");
    service.push_raw("");
    service.push(&ServerMessage::Snapshot {
        path: "/games".to_string(),
        value: json!(null),
    });

    let event = events.recv().await.expect("event stream open");
    assert_eq!(
        event,
        DbEvent::Change {
            path: DbPath::games(),
            change: DbChange::Value(json!(null)),
        }
    );
}

// ============ Writes ============

#[tokio::test]
async fn puts_resolve_on_ack() {
    let (client, _events, mut service) = start_client("alice").await;

    let put = client.put(DbPath::game("g1"), json!({ "host": "alice" }));
    let respond = async {
        match service.sent().await {
            ClientMessage::Put { req_id, path, value } => {
                assert_eq!(path, "/games/g1");
                assert_eq!(value, json!({ "host": "alice" }));
                service.push(&ServerMessage::WriteAck { req_id });
            }
            other => panic!("expected Put, got {other:?}"),
        }
    };

    let (result, ()) = tokio::join!(put, respond);
    result.expect("acked write resolves Ok");
}

#[tokio::test]
async fn rejected_writes_surface_the_service_message() {
    let (client, _events, mut service) = start_client("alice").await;

    let put = client.put(DbPath::game("g1"), json!({ "host": "alice" }));
    let respond = async {
        match service.sent().await {
            ClientMessage::Put { req_id, .. } => {
                service.push(&ServerMessage::WriteError {
                    req_id,
                    message: "denied".to_string(),
                });
            }
            other => panic!("expected Put, got {other:?}"),
        }
    };

    let (result, ()) = tokio::join!(put, respond);
    assert!(matches!(result, Err(DbError::Rejected(m)) if m == "denied"));
}

#[tokio::test]
async fn concurrent_writes_match_acks_by_request_id() {
    let (client, _events, mut service) = start_client("alice").await;

    let r1 = client.remove(DbPath::participant("bob"));
    let r2 = client.remove(DbPath::participant("carol"));
    let respond = async {
        let first = service.sent().await;
        let second = service.sent().await;
        let (id1, id2) = match (first, second) {
            (
                ClientMessage::Remove { req_id: a, path: p1 },
                ClientMessage::Remove { req_id: b, path: p2 },
            ) => {
                assert_ne!(a, b);
                assert_eq!(p1, "/participants/bob");
                assert_eq!(p2, "/participants/carol");
                (a, b)
            }
            other => panic!("expected two Removes, got {other:?}"),
        };
        // Acks arrive out of order; matching is by request id.
        service.push(&ServerMessage::WriteAck { req_id: id2 });
        service.push(&ServerMessage::WriteAck { req_id: id1 });
    };

    let (a, b, ()) = tokio::join!(r1, r2, respond);
    a.expect("first remove resolves");
    b.expect("second remove resolves");
}

#[tokio::test]
async fn disconnect_fails_pending_writes_and_closes_the_stream() {
    let (client, mut events, mut service) = start_client("alice").await;

    let put = client.put(DbPath::game("g1"), json!({ "host": "alice" }));
    let respond = async {
        let _ = service.sent().await;
        service.disconnect();
    };

    let (result, ()) = tokio::join!(put, respond);
    assert!(matches!(result, Err(DbError::Disconnected)));

    // The closed event stream is the disconnect notification.
    assert_eq!(events.recv().await, None);
}
