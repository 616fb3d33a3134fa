//! Channel-based database client.
//!
//! [`DbClient`] is the application's handle to the realtime database: a
//! cheap-to-clone front for a background router task that owns the wire.
//! Subscriptions are registered with the router and released again by a
//! guard on drop. Writes carry a request id and resolve when the service
//! acks them, so callers can await them like local futures.
//!
//! Everything crosses task boundaries over channels; the client holds no
//! shared mutable state and takes no locks. A closed event channel is the
//! disconnect signal.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use lobby_core::path::DbPath;
use lobby_core::protocol::{ClientMessage, ServerMessage};
use lobby_core::transport::{Transport, TransportReader, TransportWriter};
use lobby_core::ws::WsTransport;

/// Errors surfaced by database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// The connection is gone, or went away mid-operation.
    #[error("disconnected from database service")]
    Disconnected,
    /// The service rejected a write.
    #[error("{0}")]
    Rejected(String),
    /// The auth handshake failed.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The transport could not be established.
    #[error("connect failed: {0}")]
    Connect(String),
}

/// A change delivered on a subscribed path.
#[derive(Debug, Clone, PartialEq)]
pub enum DbChange {
    /// Full current value of the node. JSON `null` means the node is absent.
    Value(Value),
    /// A direct child with this key appeared under the node.
    ChildAdded(String),
    /// A direct child with this key disappeared from under the node.
    ChildRemoved(String),
}

/// An event delivered to the application by the router.
#[derive(Debug, Clone, PartialEq)]
pub enum DbEvent {
    /// A delivery on a path with a live subscription.
    Change { path: DbPath, change: DbChange },
    /// A connection-scoped error reported by the service.
    ServiceError { message: String },
}

/// Try to deserialize a raw text frame as a [`ServerMessage`].
///
/// Returns `None` for empty input or JSON that does not decode; such
/// frames are skipped rather than treated as fatal.
pub fn parse_server_frame(frame: &str) -> Option<ServerMessage> {
    let trimmed = frame.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str::<ServerMessage>(trimmed).ok()
}

enum Command {
    Subscribe {
        path: DbPath,
    },
    Release {
        path: DbPath,
    },
    Write {
        kind: WriteKind,
        done: oneshot::Sender<Result<(), DbError>>,
    },
}

enum WriteKind {
    Put { path: DbPath, value: Value },
    Remove { path: DbPath },
}

/// Handle to the database connection.
#[derive(Clone)]
pub struct DbClient {
    cmd: mpsc::UnboundedSender<Command>,
}

/// Keeps a subscription alive; releases it when dropped.
///
/// Once the last guard for a path is gone the router stops routing
/// deliveries for that path, so no stale event can reach the application
/// after release.
#[derive(Debug)]
pub struct SubGuard {
    path: DbPath,
    cmd: mpsc::UnboundedSender<Command>,
}

impl SubGuard {
    /// The path this guard keeps subscribed.
    pub fn path(&self) -> &DbPath {
        &self.path
    }
}

impl Drop for SubGuard {
    fn drop(&mut self) {
        let _ = self.cmd.send(Command::Release {
            path: self.path.clone(),
        });
    }
}

impl DbClient {
    /// Perform the auth handshake over `transport`, then spawn the reader,
    /// writer and router tasks.
    ///
    /// Returns the client handle and the event stream. The receiver yields
    /// `None` once the connection is gone, which is the only disconnect
    /// notification the client gives.
    pub async fn start<T: Transport>(
        transport: T,
        user_id: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DbEvent>), DbError> {
        let (mut reader, mut writer) = transport.split();

        let auth = serde_json::to_string(&ClientMessage::Auth {
            user_id: user_id.to_string(),
        })
        .map_err(|e| DbError::Connect(e.to_string()))?;
        writer.send(&auth).await.map_err(|_| DbError::Disconnected)?;

        loop {
            match reader.recv().await {
                Ok(Some(frame)) => match parse_server_frame(&frame) {
                    Some(ServerMessage::AuthOk { .. }) => break,
                    Some(ServerMessage::Error { message }) => return Err(DbError::Auth(message)),
                    Some(other) => debug!(?other, "unexpected frame during handshake"),
                    None => {}
                },
                Ok(None) | Err(_) => return Err(DbError::Disconnected),
            }
        }

        let (wire_tx, wire_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        spawn_reader_task(reader, wire_tx);
        spawn_writer_task(writer, out_rx);
        tokio::spawn(router_task(wire_rx, cmd_rx, out_tx, event_tx));

        Ok((Self { cmd: cmd_tx }, event_rx))
    }

    /// Connect to a database service over WebSocket and authenticate.
    pub async fn connect_ws(
        url: &str,
        user_id: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DbEvent>), DbError> {
        let transport = WsTransport::connect(url)
            .await
            .map_err(|e| DbError::Connect(e.to_string()))?;
        Self::start(transport, user_id).await
    }

    /// Open a watch on `path`. The returned guard releases it on drop.
    ///
    /// The service answers with an initial snapshot followed by live
    /// updates, all delivered on the event stream.
    pub fn subscribe(&self, path: DbPath) -> SubGuard {
        let _ = self.cmd.send(Command::Subscribe { path: path.clone() });
        SubGuard {
            path,
            cmd: self.cmd.clone(),
        }
    }

    /// Replace the node at `path` with `value`. Resolves on the service ack.
    pub async fn put(&self, path: DbPath, value: Value) -> Result<(), DbError> {
        self.write(WriteKind::Put { path, value }).await
    }

    /// Delete the node at `path`. Resolves on the service ack.
    pub async fn remove(&self, path: DbPath) -> Result<(), DbError> {
        self.write(WriteKind::Remove { path }).await
    }

    async fn write(&self, kind: WriteKind) -> Result<(), DbError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd
            .send(Command::Write {
                kind,
                done: done_tx,
            })
            .map_err(|_| DbError::Disconnected)?;
        done_rx.await.map_err(|_| DbError::Disconnected)?
    }
}

/// Reads text frames off the transport, parses them, and forwards them to
/// the router. Exits when the connection closes or the router is gone;
/// dropping the channel is the close signal downstream.
fn spawn_reader_task<R: TransportReader>(
    mut reader: R,
    wire_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    tokio::spawn(async move {
        while let Ok(Some(frame)) = reader.recv().await {
            if let Some(msg) = parse_server_frame(&frame)
                && wire_tx.send(msg).is_err()
            {
                break;
            }
        }
    });
}

/// Serializes outbound messages and writes them to the transport.
fn spawn_writer_task<W: TransportWriter>(
    mut writer: W,
    mut out_rx: mpsc::UnboundedReceiver<ClientMessage>,
) {
    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(_) => continue,
            };
            if writer.send(&json).await.is_err() {
                break;
            }
        }
    });
}

/// Owns the subscription table and the in-flight write map.
///
/// Subscriptions are refcounted per path: the wire sees one `Subscribe`
/// when the count goes 0 to 1 and one `Unsubscribe` when it drops back to
/// 0. Deliveries for paths without a live subscription are dropped here,
/// never forwarded.
async fn router_task(
    mut wire_rx: mpsc::UnboundedReceiver<ServerMessage>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    out_tx: mpsc::UnboundedSender<ClientMessage>,
    event_tx: mpsc::UnboundedSender<DbEvent>,
) {
    let mut subs: HashMap<DbPath, usize> = HashMap::new();
    let mut pending: HashMap<u64, oneshot::Sender<Result<(), DbError>>> = HashMap::new();
    let mut next_req_id: u64 = 1;

    loop {
        tokio::select! {
            msg = wire_rx.recv() => {
                let Some(msg) = msg else { break };
                route_server_message(msg, &subs, &mut pending, &event_tx);
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    Command::Subscribe { path } => {
                        let count = subs.entry(path.clone()).or_insert(0);
                        *count += 1;
                        if *count == 1 {
                            let _ = out_tx.send(ClientMessage::Subscribe {
                                path: path.as_str().to_string(),
                            });
                        }
                    }
                    Command::Release { path } => match subs.get_mut(&path) {
                        Some(count) if *count > 1 => *count -= 1,
                        Some(_) => {
                            subs.remove(&path);
                            let _ = out_tx.send(ClientMessage::Unsubscribe {
                                path: path.as_str().to_string(),
                            });
                        }
                        None => debug!(%path, "release for unknown subscription"),
                    },
                    Command::Write { kind, done } => {
                        let req_id = next_req_id;
                        next_req_id += 1;
                        let msg = match kind {
                            WriteKind::Put { path, value } => ClientMessage::Put {
                                req_id,
                                path: path.as_str().to_string(),
                                value,
                            },
                            WriteKind::Remove { path } => ClientMessage::Remove {
                                req_id,
                                path: path.as_str().to_string(),
                            },
                        };
                        if out_tx.send(msg).is_err() {
                            let _ = done.send(Err(DbError::Disconnected));
                        } else {
                            pending.insert(req_id, done);
                        }
                    }
                }
            }
        }
    }

    // Connection gone: fail every in-flight write. The event channel drops
    // with this task, which is what tells the application.
    for (_, done) in pending.drain() {
        let _ = done.send(Err(DbError::Disconnected));
    }
}

fn route_server_message(
    msg: ServerMessage,
    subs: &HashMap<DbPath, usize>,
    pending: &mut HashMap<u64, oneshot::Sender<Result<(), DbError>>>,
    event_tx: &mpsc::UnboundedSender<DbEvent>,
) {
    match msg {
        ServerMessage::Snapshot { path, value } => {
            deliver(subs, event_tx, &path, DbChange::Value(value));
        }
        ServerMessage::ChildAdded { path, key } => {
            deliver(subs, event_tx, &path, DbChange::ChildAdded(key));
        }
        ServerMessage::ChildRemoved { path, key } => {
            deliver(subs, event_tx, &path, DbChange::ChildRemoved(key));
        }
        ServerMessage::WriteAck { req_id } => match pending.remove(&req_id) {
            Some(done) => {
                let _ = done.send(Ok(()));
            }
            None => warn!(req_id, "ack for unknown write"),
        },
        ServerMessage::WriteError { req_id, message } => match pending.remove(&req_id) {
            Some(done) => {
                let _ = done.send(Err(DbError::Rejected(message)));
            }
            None => warn!(req_id, message, "error for unknown write"),
        },
        ServerMessage::Error { message } => {
            let _ = event_tx.send(DbEvent::ServiceError { message });
        }
        ServerMessage::AuthOk { .. } => debug!("duplicate auth confirmation"),
        ServerMessage::Pong => {}
    }
}

fn deliver(
    subs: &HashMap<DbPath, usize>,
    event_tx: &mpsc::UnboundedSender<DbEvent>,
    path: &str,
    change: DbChange,
) {
    let Ok(path) = DbPath::parse(path) else {
        debug!(path, "delivery on unparseable path");
        return;
    };
    if !subs.contains_key(&path) {
        debug!(%path, "delivery on released path");
        return;
    }
    let _ = event_tx.send(DbEvent::Change { path, change });
}
