//! Game node model and role-derived actions.
//!
//! A game node lives at `/games/{id}` and is mirrored locally verbatim:
//! each subscription snapshot fully replaces the previous mirror, nothing
//! is merged. The action set a user sees on a game is derived fresh from
//! the mirror on every render and never stored.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File extension of save files accepted by the start-game flow.
pub const SAVE_EXTENSION: &str = "Civ6Save";

/// Display name for the save-file dialog filter.
pub const SAVE_FILTER_NAME: &str = "Civ6 saves";

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Lifecycle of a game room, stored remotely as a small integer code.
///
/// Codes this client does not know are preserved and shown numerically
/// rather than dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GameStatus {
    /// Accepting participants.
    Open,
    /// The host has started the game.
    InProgress,
    /// Finished.
    Complete,
    /// A code this client version does not know.
    Unknown(u8),
}

impl GameStatus {
    /// The wire code for this status.
    pub fn code(self) -> u8 {
        match self {
            GameStatus::Open => 0,
            GameStatus::InProgress => 1,
            GameStatus::Complete => 2,
            GameStatus::Unknown(code) => code,
        }
    }
}

impl From<u8> for GameStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => GameStatus::Open,
            1 => GameStatus::InProgress,
            2 => GameStatus::Complete,
            other => GameStatus::Unknown(other),
        }
    }
}

impl From<GameStatus> for u8 {
    fn from(status: GameStatus) -> Self {
        status.code()
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::Open
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Open => f.write_str("Open"),
            GameStatus::InProgress => f.write_str("In progress"),
            GameStatus::Complete => f.write_str("Complete"),
            GameStatus::Unknown(code) => write!(f, "Status {code}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Game node
// ---------------------------------------------------------------------------

/// One entry of a game's participants array.
///
/// Wire shape: `{ "participant": "<user id>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub participant: String,
}

/// Wire shape of one `/games/{id}` node.
///
/// Every field may be absent on the remote side; absent fields decode to
/// defaults so a sparse node still mirrors cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameNode {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub participants: Vec<ParticipantEntry>,
}

impl GameNode {
    /// Decode a subscription snapshot.
    ///
    /// Returns `None` for JSON `null` (node does not exist) and for values
    /// that do not decode as a game node.
    pub fn from_snapshot(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// The participant user ids, in array order.
    pub fn participant_ids(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|entry| entry.participant.clone())
            .collect()
    }

    /// Build the participants array value for a `Put`.
    pub fn participants_value(ids: &[String]) -> Value {
        let entries: Vec<ParticipantEntry> = ids
            .iter()
            .map(|id| ParticipantEntry {
                participant: id.clone(),
            })
            .collect();
        serde_json::to_value(entries).unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// One action button offered on a game panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Start,
    Cancel,
    Leave,
    Join,
}

impl GameAction {
    /// Stable element id for the rendered button.
    pub fn id(self) -> &'static str {
        match self {
            GameAction::Start => "btn-start",
            GameAction::Cancel => "btn-cancel",
            GameAction::Leave => "btn-leave",
            GameAction::Join => "btn-join",
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            GameAction::Start => "Start game",
            GameAction::Cancel => "Cancel game",
            GameAction::Leave => "Leave game",
            GameAction::Join => "Join game",
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the action set `user_id` sees on a game.
///
/// Exactly one of four fixed sets is returned: hosts manage the game,
/// participants can step out, everyone else can join, and an anonymous
/// user (empty id) gets nothing. A host who also appears among the
/// participants is treated as host.
pub fn game_actions(user_id: &str, host: &str, participants: &[String]) -> Vec<GameAction> {
    if user_id.is_empty() {
        return Vec::new();
    }
    let is_host = !host.is_empty() && user_id == host;
    let is_participant = participants.iter().any(|p| p == user_id);

    if is_host {
        vec![GameAction::Start, GameAction::Cancel]
    } else if is_participant {
        vec![GameAction::Leave]
    } else {
        vec![GameAction::Join]
    }
}

// ---------------------------------------------------------------------------
// Save file validation
// ---------------------------------------------------------------------------

/// Check that a picked file looks like a save the start flow accepts.
///
/// Returns a user-facing error string on rejection.
pub fn validate_save_file(path: &Path) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(SAVE_EXTENSION) => Ok(()),
        _ => Err(format!(
            "Not a .{SAVE_EXTENSION} file: {}",
            path.display()
        )),
    }
}
