use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from the client to the database service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Identify this connection. Must be the first message sent.
    Auth { user_id: String },

    /// Open a watch on a node. The service answers with the node's current
    /// value as a [`ServerMessage::Snapshot`], one
    /// [`ServerMessage::ChildAdded`] per existing direct child, and then
    /// deltas and fresh snapshots as the node changes.
    Subscribe { path: String },

    /// Close a previously opened watch.
    Unsubscribe { path: String },

    /// Replace the node at `path` with `value`.
    Put { req_id: u64, path: String, value: Value },

    /// Delete the node at `path`.
    Remove { req_id: u64, path: String },

    /// Ping to check the connection.
    Ping,
}

/// Messages sent from the database service to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The [`ClientMessage::Auth`] handshake was accepted.
    AuthOk { user_id: String },

    /// Point-in-time value of a subscribed node. `value` is JSON `null`
    /// when the node does not exist.
    Snapshot { path: String, value: Value },

    /// A direct child appeared under a subscribed node.
    ChildAdded { path: String, key: String },

    /// A direct child disappeared from under a subscribed node.
    ChildRemoved { path: String, key: String },

    /// A `Put`/`Remove` was applied.
    WriteAck { req_id: u64 },

    /// A `Put`/`Remove` was rejected.
    WriteError { req_id: u64, message: String },

    /// Connection-scoped failure (including auth rejection).
    Error { message: String },

    /// Pong response to ping.
    Pong,
}
