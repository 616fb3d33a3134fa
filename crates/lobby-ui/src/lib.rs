//! Shared Dioxus UI components for the lobby app.
//!
//! This crate is platform-agnostic. It provides the screen components,
//! the shared `UiMessage` type, and the session loop in [`app_logic`];
//! the desktop crate (`lobby-gui`) supplies the window, the on-disk
//! settings store, and the native save-file picker.

pub mod app_logic;
pub mod components;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Which screen the app is showing.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Connect,
    Lobby,
}

/// Messages sent from UI components to the background coroutine.
#[derive(Debug)]
pub enum UiMessage {
    /// Connect to a database service as a user.
    Connect { server_url: String, user_id: String },
    /// Create a new game with the given display name.
    CreateGame { name: String },
    /// Join a visible game.
    JoinGame { game_id: String },
    /// Leave a game we participate in.
    LeaveGame { game_id: String },
    /// Pick a save file and start a game we host.
    StartGame { game_id: String },
    /// Cancel a game we host.
    CancelGame { game_id: String },
    /// Drop the connection and return to the connect screen.
    SignOut,
}
