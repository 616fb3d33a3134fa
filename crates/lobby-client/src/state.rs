//! Local mirror of the lobby.
//!
//! [`LobbyState`] is the client-side copy of the remote tree: the visible
//! game ids in arrival order, one [`GameDetail`] mirror per game, and a
//! bounded feed of [`LobbyEvent`]s for the UI log. Only the controller
//! mutates it, by applying database deliveries and recording operation
//! outcomes; rendering reads it and derives everything else on the fly.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use lobby_core::game::{GameAction, GameNode, GameStatus, game_actions};

/// Most recent entries kept in the event feed.
const EVENT_FEED_LIMIT: usize = 100;

/// Semantic category for feed entries. The UI decides how each is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    System,
    Action,
    Error,
    Info,
}

/// A structured entry in the lobby event feed.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// Connected and authenticated.
    Connected { user_id: String },
    /// A game appeared in the visible list.
    GameAdded { id: String },
    /// A game left the visible list.
    GameRemoved { id: String },
    /// We created a game.
    GameCreated { id: String, name: String },
    /// We joined a game.
    JoinedGame { id: String },
    /// We left a game.
    LeftGame { id: String },
    /// A save file was handed to the turn-upload flow.
    UploadRequested { id: String, file: String },
    /// We cancelled a game; every cleanup write settled.
    GameCancelled { id: String },
    /// The service rejected a write, or it never resolved.
    WriteFailed { message: String },
    /// A connection-scoped error reported by the service.
    ServiceError { message: String },
    /// The connection dropped.
    Disconnected,
    /// Free-form local feedback.
    Text { text: String, category: LogCategory },
}

impl LobbyEvent {
    /// Category used for styling the entry.
    pub fn category(&self) -> LogCategory {
        match self {
            Self::Connected { .. } | Self::GameCreated { .. } | Self::GameCancelled { .. } => {
                LogCategory::System
            }
            Self::JoinedGame { .. } | Self::LeftGame { .. } | Self::UploadRequested { .. } => {
                LogCategory::Action
            }
            Self::WriteFailed { .. } | Self::ServiceError { .. } | Self::Disconnected => {
                LogCategory::Error
            }
            Self::GameAdded { .. } | Self::GameRemoved { .. } => LogCategory::Info,
            Self::Text { category, .. } => *category,
        }
    }
}

/// What a single applied event modified. The UI uses this to skip
/// re-rendering when a delivery turned out to be a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateChanged {
    /// The visible game list gained or lost an entry.
    pub list: bool,
    /// Some game's detail mirror was replaced.
    pub detail: bool,
    /// The event feed gained an entry.
    pub feed: bool,
}

impl StateChanged {
    /// Returns `true` if any flag is set.
    pub fn any(self) -> bool {
        self.list || self.detail || self.feed
    }
}

/// Local mirror of one game node.
///
/// Fully replaced from each snapshot; a null snapshot resets every field
/// to its empty state so nothing stale survives the node's absence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDetail {
    pub id: String,
    pub name: String,
    pub host: String,
    pub status: GameStatus,
    pub participants: Vec<String>,
}

impl GameDetail {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Display title: the game's name, falling back to its id while the
    /// first snapshot is still in flight.
    pub fn title(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    /// Replace every field from a snapshot value.
    pub fn apply_snapshot(&mut self, value: &Value) {
        match GameNode::from_snapshot(value) {
            Some(node) => {
                self.participants = node.participant_ids();
                self.name = node.name;
                self.host = node.host;
                self.status = node.status;
            }
            None => {
                self.name.clear();
                self.host.clear();
                self.status = GameStatus::default();
                self.participants.clear();
            }
        }
    }
}

/// The lobby mirror plus the event feed.
#[derive(Debug, Clone)]
pub struct LobbyState {
    /// Recent events, oldest first, capped at [`EVENT_FEED_LIMIT`].
    pub events: VecDeque<LobbyEvent>,
    /// Visible game ids in the order the service announced them.
    pub game_ids: Vec<String>,
    /// Per-game mirrors keyed by id.
    pub games: HashMap<String, GameDetail>,
    /// The authenticated user.
    pub user_id: String,
    /// Whether the connection is still up.
    pub connected: bool,
}

impl LobbyState {
    pub fn new(user_id: &str) -> Self {
        Self {
            events: VecDeque::new(),
            game_ids: Vec::new(),
            games: HashMap::new(),
            user_id: user_id.to_string(),
            connected: true,
        }
    }

    /// Append a feed entry, dropping the oldest past the cap.
    pub fn add_event(&mut self, event: LobbyEvent) {
        self.events.push_back(event);
        if self.events.len() > EVENT_FEED_LIMIT {
            self.events.pop_front();
        }
    }

    /// Append a free-form [`LobbyEvent::Text`] entry.
    pub fn add_message(&mut self, text: String, category: LogCategory) {
        self.add_event(LobbyEvent::Text { text, category });
    }

    /// Record a game announced by a child-added delivery.
    ///
    /// New ids append at the end; existing ids never move, and a duplicate
    /// delivery changes nothing. Returns whether the list changed.
    pub fn add_game(&mut self, id: &str) -> bool {
        if self.games.contains_key(id) {
            return false;
        }
        self.game_ids.push(id.to_string());
        self.games.insert(id.to_string(), GameDetail::new(id));
        self.add_event(LobbyEvent::GameAdded { id: id.to_string() });
        true
    }

    /// Drop a game announced by a child-removed delivery.
    ///
    /// Returns whether the list changed; an unknown id changes nothing.
    pub fn remove_game(&mut self, id: &str) -> bool {
        if self.games.remove(id).is_none() {
            return false;
        }
        self.game_ids.retain(|g| g != id);
        self.add_event(LobbyEvent::GameRemoved { id: id.to_string() });
        true
    }

    /// Replace a game's mirror from a subscription snapshot.
    ///
    /// Deliveries for ids not in the visible list are ignored. Returns
    /// whether a mirror was updated.
    pub fn apply_game_snapshot(&mut self, id: &str, value: &Value) -> bool {
        match self.games.get_mut(id) {
            Some(detail) => {
                detail.apply_snapshot(value);
                true
            }
            None => false,
        }
    }

    /// Look up a game's mirror.
    pub fn game(&self, id: &str) -> Option<&GameDetail> {
        self.games.get(id)
    }

    /// Derive the current user's action set for a game.
    ///
    /// Computed fresh from the mirror on every call, so it is always
    /// consistent with the latest snapshot.
    pub fn actions_for(&self, id: &str) -> Vec<GameAction> {
        match self.games.get(id) {
            Some(detail) => game_actions(&self.user_id, &detail.host, &detail.participants),
            None => Vec::new(),
        }
    }
}
