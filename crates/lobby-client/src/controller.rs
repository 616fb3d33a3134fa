//! Lobby controller.
//!
//! Owns the [`DbClient`], the subscription guards, and the [`LobbyState`]
//! mirror. It is the single gateway between the database event stream and
//! the rendered state: [`recv`](LobbyController::recv) /
//! [`try_recv`](LobbyController::try_recv) apply one delivery each, and
//! the lobby operations issue the writes and report their outcomes to the
//! event feed.
//!
//! The controller keeps the list subscription open for its whole life and
//! one detail subscription per visible game, opened when the service
//! announces the game and released when it disappears.

use std::collections::HashMap;
use std::path::Path;

use futures_util::future::try_join_all;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use lobby_core::game::{GameNode, GameStatus, validate_save_file};
use lobby_core::path::{DbPath, generate_key};
use lobby_core::transport::Transport;

use crate::client::{DbChange, DbClient, DbError, DbEvent, SubGuard};
use crate::state::{LobbyEvent, LobbyState, LogCategory, StateChanged};

/// Outcome of pumping one event from the database connection.
#[derive(Debug)]
pub enum PollResult {
    /// An event was applied; the flags say what it modified.
    Updated(StateChanged),
    /// The connection is gone.
    Disconnected,
    /// No event was queued.
    Empty,
}

/// Owns the connection and the lobby mirror.
pub struct LobbyController {
    client: DbClient,
    events: mpsc::UnboundedReceiver<DbEvent>,
    _games_sub: SubGuard,
    detail_subs: HashMap<String, SubGuard>,
    pub state: LobbyState,
}

impl LobbyController {
    /// Authenticate over an established transport and open the lobby.
    pub async fn start<T: Transport>(transport: T, user_id: &str) -> Result<Self, DbError> {
        let (client, events) = DbClient::start(transport, user_id).await?;
        Ok(Self::new(client, events, user_id))
    }

    /// Connect to a database service over WebSocket and open the lobby.
    pub async fn connect_ws(url: &str, user_id: &str) -> Result<Self, DbError> {
        let (client, events) = DbClient::connect_ws(url, user_id).await?;
        Ok(Self::new(client, events, user_id))
    }

    fn new(
        client: DbClient,
        events: mpsc::UnboundedReceiver<DbEvent>,
        user_id: &str,
    ) -> Self {
        let games_sub = client.subscribe(DbPath::games());
        let mut state = LobbyState::new(user_id);
        state.add_event(LobbyEvent::Connected {
            user_id: user_id.to_string(),
        });
        Self {
            client,
            events,
            _games_sub: games_sub,
            detail_subs: HashMap::new(),
            state,
        }
    }

    /// Apply one queued database event without blocking.
    pub fn try_recv(&mut self) -> PollResult {
        match self.events.try_recv() {
            Ok(event) => PollResult::Updated(self.apply(event)),
            Err(mpsc::error::TryRecvError::Empty) => PollResult::Empty,
            Err(mpsc::error::TryRecvError::Disconnected) => self.on_disconnect(),
        }
    }

    /// Await the next database event and apply it.
    pub async fn recv(&mut self) -> PollResult {
        match self.events.recv().await {
            Some(event) => PollResult::Updated(self.apply(event)),
            None => self.on_disconnect(),
        }
    }

    fn on_disconnect(&mut self) -> PollResult {
        if self.state.connected {
            self.state.connected = false;
            self.state.add_event(LobbyEvent::Disconnected);
        }
        PollResult::Disconnected
    }

    fn apply(&mut self, event: DbEvent) -> StateChanged {
        let mut changed = StateChanged::default();
        match event {
            DbEvent::Change { path, change } => self.apply_change(path, change, &mut changed),
            DbEvent::ServiceError { message } => {
                self.state.add_event(LobbyEvent::ServiceError { message });
                changed.feed = true;
            }
        }
        changed
    }

    fn apply_change(&mut self, path: DbPath, change: DbChange, changed: &mut StateChanged) {
        if path == DbPath::games() {
            match change {
                DbChange::ChildAdded(id) => {
                    if self.state.add_game(&id) {
                        let guard = self.client.subscribe(DbPath::game(&id));
                        self.detail_subs.insert(id, guard);
                        changed.list = true;
                        changed.feed = true;
                    }
                }
                DbChange::ChildRemoved(id) => {
                    if self.state.remove_game(&id) {
                        self.detail_subs.remove(&id);
                        changed.list = true;
                        changed.feed = true;
                    }
                }
                // The list works from membership deltas alone.
                DbChange::Value(_) => {}
            }
            return;
        }

        if path.parent().as_ref() == Some(&DbPath::games()) {
            match change {
                DbChange::Value(value) => {
                    if self.state.apply_game_snapshot(path.key(), &value) {
                        changed.detail = true;
                    }
                }
                // Member deltas under a game are subsumed by its snapshots.
                DbChange::ChildAdded(_) | DbChange::ChildRemoved(_) => {}
            }
            return;
        }

        debug!(%path, "delivery on unhandled path");
    }

    /// Create a game hosted by the current user.
    ///
    /// The local list is not touched; the game appears when the service
    /// delivers the child-added notification, same as for everyone else.
    pub async fn create_game(&mut self, name: &str) -> Result<String, DbError> {
        let id = generate_key();
        let node = json!({
            "host": self.state.user_id,
            "name": name,
            "status": GameStatus::Open.code(),
            "participants": [],
        });
        match self.client.put(DbPath::game(&id), node).await {
            Ok(()) => {
                self.state.add_event(LobbyEvent::GameCreated {
                    id: id.clone(),
                    name: name.to_string(),
                });
                Ok(id)
            }
            Err(err) => Err(self.report_write_failure(err)),
        }
    }

    /// Join a game as the current user.
    ///
    /// Writes the extended participant list, then the user's own
    /// membership node. Hosts and existing participants get a feed notice
    /// and no writes.
    pub async fn join_game(&mut self, id: &str) -> Result<(), DbError> {
        let user = self.state.user_id.clone();
        let Some(detail) = self.state.game(id).cloned() else {
            self.no_such_game(id);
            return Ok(());
        };
        if detail.host == user || detail.participants.contains(&user) {
            self.state.add_message(
                format!("Already in {}", detail.title()),
                LogCategory::Info,
            );
            return Ok(());
        }

        let mut participants = detail.participants;
        participants.push(user.clone());
        if let Err(err) = self
            .client
            .put(
                DbPath::game_participants(id),
                GameNode::participants_value(&participants),
            )
            .await
        {
            return Err(self.report_write_failure(err));
        }
        if let Err(err) = self
            .client
            .put(DbPath::participant(&user), json!({ "game": id }))
            .await
        {
            return Err(self.report_write_failure(err));
        }
        self.state.add_event(LobbyEvent::JoinedGame { id: id.to_string() });
        Ok(())
    }

    /// Leave a game the current user participates in.
    pub async fn leave_game(&mut self, id: &str) -> Result<(), DbError> {
        let user = self.state.user_id.clone();
        let Some(detail) = self.state.game(id).cloned() else {
            self.no_such_game(id);
            return Ok(());
        };
        if !detail.participants.contains(&user) {
            self.state.add_message(
                format!("Not a participant of {}", detail.title()),
                LogCategory::Info,
            );
            return Ok(());
        }

        let remaining: Vec<String> = detail
            .participants
            .iter()
            .filter(|p| *p != &user)
            .cloned()
            .collect();
        if let Err(err) = self
            .client
            .put(
                DbPath::game_participants(id),
                GameNode::participants_value(&remaining),
            )
            .await
        {
            return Err(self.report_write_failure(err));
        }
        if let Err(err) = self.client.remove(DbPath::participant(&user)).await {
            return Err(self.report_write_failure(err));
        }
        self.state.add_event(LobbyEvent::LeftGame { id: id.to_string() });
        Ok(())
    }

    /// Start a game with the picked save file.
    ///
    /// Validates the file name, hands the path to the turn-upload flow,
    /// and marks the game in progress. The save bytes travel through the
    /// upload service, not the database connection.
    pub async fn start_game(&mut self, id: &str, save: &Path) -> Result<(), DbError> {
        if self.state.game(id).is_none() {
            self.no_such_game(id);
            return Ok(());
        }
        if let Err(message) = validate_save_file(save) {
            self.state.add_message(message, LogCategory::Error);
            return Ok(());
        }

        self.state.add_event(LobbyEvent::UploadRequested {
            id: id.to_string(),
            file: save.display().to_string(),
        });
        if let Err(err) = self
            .client
            .put(DbPath::game_status(id), json!(GameStatus::InProgress.code()))
            .await
        {
            return Err(self.report_write_failure(err));
        }
        Ok(())
    }

    /// Cancel a game: remove every participant's membership node in
    /// parallel, then remove the game node itself.
    ///
    /// The game node only goes away once all membership removals resolved.
    /// If any of them fails the game node is left in place; removals that
    /// already landed are not rolled back.
    pub async fn cancel_game(&mut self, id: &str) -> Result<(), DbError> {
        let Some(detail) = self.state.game(id).cloned() else {
            self.no_such_game(id);
            return Ok(());
        };

        let removals = detail
            .participants
            .iter()
            .map(|participant| self.client.remove(DbPath::participant(participant)));
        if let Err(err) = try_join_all(removals).await {
            return Err(self.report_write_failure(err));
        }
        if let Err(err) = self.client.remove(DbPath::game(id)).await {
            return Err(self.report_write_failure(err));
        }
        self.state.add_event(LobbyEvent::GameCancelled { id: id.to_string() });
        Ok(())
    }

    fn no_such_game(&mut self, id: &str) {
        self.state
            .add_message(format!("No such game: {id}"), LogCategory::Error);
    }

    fn report_write_failure(&mut self, err: DbError) -> DbError {
        self.state.add_event(LobbyEvent::WriteFailed {
            message: err.to_string(),
        });
        err
    }
}
