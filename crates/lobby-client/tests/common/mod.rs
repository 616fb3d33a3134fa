//! Shared test support: an in-memory transport plus helpers that play the
//! service side of the connection.

use serde_json::{Value, json};
use tokio::sync::mpsc;

use lobby_client::client::{DbClient, DbEvent};
use lobby_client::controller::{LobbyController, PollResult};
use lobby_core::path::DbPath;
use lobby_core::protocol::{ClientMessage, ServerMessage};
use lobby_core::transport::{Transport, TransportError, TransportReader, TransportWriter};

/// In-memory transport handed to the client under test.
pub struct ChannelTransport {
    rx: mpsc::UnboundedReceiver<String>,
    tx: mpsc::UnboundedSender<String>,
}

pub struct ChannelReader {
    rx: mpsc::UnboundedReceiver<String>,
}

pub struct ChannelWriter {
    tx: mpsc::UnboundedSender<String>,
}

impl Transport for ChannelTransport {
    type Reader = ChannelReader;
    type Writer = ChannelWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        (ChannelReader { rx: self.rx }, ChannelWriter { tx: self.tx })
    }
}

impl TransportReader for ChannelReader {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

impl TransportWriter for ChannelWriter {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.tx
            .send(text.to_string())
            .map_err(|_| TransportError::ConnectionClosed)
    }
}

/// The service side of a [`ChannelTransport`] pair.
pub struct ServiceEnd {
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl ServiceEnd {
    /// Inject a service message into the client's read side.
    pub fn push(&self, msg: &ServerMessage) {
        self.to_client.send(serde_json::to_string(msg).unwrap()).unwrap();
    }

    /// Inject a raw text frame, valid JSON or not.
    pub fn push_raw(&self, raw: &str) {
        self.to_client.send(raw.to_string()).unwrap();
    }

    /// Await the next message the client put on the wire.
    pub async fn sent(&mut self) -> ClientMessage {
        let raw = self.from_client.recv().await.expect("client hung up");
        serde_json::from_str(&raw).unwrap()
    }

    /// Pop the next client message if one is already queued.
    pub fn try_sent(&mut self) -> Option<ClientMessage> {
        self.from_client
            .try_recv()
            .ok()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    /// Close the connection from the service side.
    pub fn disconnect(self) {}
}

/// Build a connected (client transport, service end) pair.
pub fn channel_transport() -> (ChannelTransport, ServiceEnd) {
    let (to_client, client_rx) = mpsc::unbounded_channel();
    let (client_tx, from_client) = mpsc::unbounded_channel();
    (
        ChannelTransport {
            rx: client_rx,
            tx: client_tx,
        },
        ServiceEnd {
            to_client,
            from_client,
        },
    )
}

/// Start a client over a fresh channel transport, completing the auth
/// handshake and consuming the `Auth` frame from the outbox.
pub async fn start_client(
    user_id: &str,
) -> (DbClient, mpsc::UnboundedReceiver<DbEvent>, ServiceEnd) {
    let (transport, mut service) = channel_transport();
    service.push(&ServerMessage::AuthOk {
        user_id: user_id.to_string(),
    });
    let (client, events) = DbClient::start(transport, user_id).await.expect("handshake");
    match service.sent().await {
        ClientMessage::Auth { user_id: sent } => assert_eq!(sent, user_id),
        other => panic!("expected Auth first, got {other:?}"),
    }
    (client, events, service)
}

/// Start a controller the same way, additionally consuming the games-list
/// `Subscribe` it opens on startup.
pub async fn start_controller(user_id: &str) -> (LobbyController, ServiceEnd) {
    let (transport, mut service) = channel_transport();
    service.push(&ServerMessage::AuthOk {
        user_id: user_id.to_string(),
    });
    let ctrl = LobbyController::start(transport, user_id)
        .await
        .expect("handshake");
    match service.sent().await {
        ClientMessage::Auth { user_id: sent } => assert_eq!(sent, user_id),
        other => panic!("expected Auth first, got {other:?}"),
    }
    match service.sent().await {
        ClientMessage::Subscribe { path } => assert_eq!(path, "/games"),
        other => panic!("expected the games-list Subscribe, got {other:?}"),
    }
    (ctrl, service)
}

/// Build a game node value in the wire layout.
pub fn node(host: &str, name: &str, status: u8, participants: &[&str]) -> Value {
    let entries: Vec<Value> = participants
        .iter()
        .map(|p| json!({ "participant": p }))
        .collect();
    json!({ "host": host, "name": name, "status": status, "participants": entries })
}

/// Announce a game and deliver its first snapshot, consuming the detail
/// `Subscribe` from the outbox. Leaves the controller fully caught up.
pub async fn seed_game(
    ctrl: &mut LobbyController,
    service: &mut ServiceEnd,
    id: &str,
    value: &Value,
) {
    service.push(&ServerMessage::ChildAdded {
        path: "/games".to_string(),
        key: id.to_string(),
    });
    assert!(matches!(ctrl.recv().await, PollResult::Updated(_)));
    match service.sent().await {
        ClientMessage::Subscribe { path } => assert_eq!(path, format!("/games/{id}")),
        other => panic!("expected a detail Subscribe, got {other:?}"),
    }
    service.push(&ServerMessage::Snapshot {
        path: format!("/games/{id}"),
        value: value.clone(),
    });
    assert!(matches!(ctrl.recv().await, PollResult::Updated(_)));
}

/// Issue a dummy write and ack it. Serves as an ordering fence: once it
/// resolves, the router has processed every command sent before it.
pub async fn ack_next_write(client: &DbClient, service: &mut ServiceEnd) {
    let put = client.put(DbPath::parse("/fence").unwrap(), Value::Null);
    let respond = async {
        match service.sent().await {
            ClientMessage::Put { req_id, .. } => service.push(&ServerMessage::WriteAck { req_id }),
            other => panic!("expected the fence Put, got {other:?}"),
        }
    };
    let (result, ()) = tokio::join!(put, respond);
    result.expect("fence write should succeed");
}
