//! Platform-agnostic Dioxus application lifecycle logic.
//!
//! Contains the lobby loop and the full session lifecycle, parameterised
//! over a [`SettingsStore`](lobby_client::settings::SettingsStore) and an
//! async save-file picker so the platform crate only needs to provide
//! thin adapters around its native facilities.

use std::path::PathBuf;

use dioxus::prelude::*;
use futures_util::StreamExt;
use lobby_client::controller::{LobbyController, PollResult};
use lobby_client::settings::SettingsStore;
use lobby_client::state::LobbyState;

use crate::{Screen, UiMessage};

// ---------------------------------------------------------------------------
// Lobby loop
// ---------------------------------------------------------------------------

/// Why the lobby loop ended.
pub enum LobbyLoopExit {
    /// Connection dropped (network error, service closed, etc.).
    Disconnected,
    /// User deliberately signed out.
    SignedOut,
}

/// Run the lobby loop, returning when the connection drops or the user
/// signs out.
///
/// Database deliveries and UI actions are interleaved here: each applied
/// delivery and each completed operation publishes the controller's state
/// to the `lobby` signal. `pick_save` opens the platform's file picker
/// and resolves to the chosen path, or `None` when dismissed.
pub async fn lobby_loop<P, Fut>(
    ctrl: &mut LobbyController,
    rx: &mut UnboundedReceiver<UiMessage>,
    lobby: &mut Signal<LobbyState>,
    pick_save: &P,
) -> LobbyLoopExit
where
    P: Fn() -> Fut,
    Fut: std::future::Future<Output = Option<PathBuf>>,
{
    loop {
        tokio::select! {
            poll = ctrl.recv() => {
                match poll {
                    PollResult::Updated(changed) => {
                        // No-op deliveries (duplicate announcements, stale
                        // snapshots) do not warrant a re-render.
                        if changed.any() {
                            lobby.set(ctrl.state.clone());
                        }
                    }
                    PollResult::Disconnected => {
                        lobby.set(ctrl.state.clone());
                        return LobbyLoopExit::Disconnected;
                    }
                    PollResult::Empty => {}
                }
            }
            msg = rx.next() => {
                let Some(msg) = msg else {
                    return LobbyLoopExit::Disconnected;
                };
                match msg {
                    UiMessage::CreateGame { name } => {
                        let _ = ctrl.create_game(&name).await;
                    }
                    UiMessage::JoinGame { game_id } => {
                        let _ = ctrl.join_game(&game_id).await;
                    }
                    UiMessage::LeaveGame { game_id } => {
                        let _ = ctrl.leave_game(&game_id).await;
                    }
                    UiMessage::StartGame { game_id } => {
                        if let Some(save) = pick_save().await {
                            let _ = ctrl.start_game(&game_id, &save).await;
                        }
                    }
                    UiMessage::CancelGame { game_id } => {
                        let _ = ctrl.cancel_game(&game_id).await;
                    }
                    UiMessage::SignOut => {
                        return LobbyLoopExit::SignedOut;
                    }
                    UiMessage::Connect { .. } => {
                        // Ignore duplicate connect requests.
                    }
                }
                // Operation outcomes land in the event feed; publish them.
                lobby.set(ctrl.state.clone());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Full coroutine lifecycle
// ---------------------------------------------------------------------------

/// Drive the entire application session lifecycle.
///
/// This is the async body that a Dioxus `use_coroutine` should run. It
/// loops waiting for [`UiMessage::Connect`], connects and authenticates,
/// runs the lobby loop, and falls back to the connect screen on sign-out
/// or disconnect. Successful connects update the persisted settings so
/// the form comes up pre-filled next run.
pub async fn run_app_session<S, P, Fut>(
    mut rx: UnboundedReceiver<UiMessage>,
    mut screen: Signal<Screen>,
    mut lobby: Signal<LobbyState>,
    mut conn_error: Signal<String>,
    store: S,
    pick_save: P,
) where
    S: SettingsStore,
    P: Fn() -> Fut,
    Fut: std::future::Future<Output = Option<PathBuf>>,
{
    loop {
        screen.set(Screen::Connect);
        lobby.set(LobbyState::new(""));

        // Wait for a Connect message from the connect screen.
        let (server_url, user_id) = loop {
            if let Some(UiMessage::Connect {
                server_url,
                user_id,
            }) = rx.next().await
            {
                break (server_url, user_id);
            }
        };

        conn_error.set(String::new());
        let mut ctrl = match LobbyController::connect_ws(&server_url, &user_id).await {
            Ok(ctrl) => ctrl,
            Err(e) => {
                conn_error.set(format!("Connection failed: {e}"));
                continue;
            }
        };

        let mut settings = store.load();
        settings.server_url = server_url;
        settings.user_id = user_id;
        store.save(&settings);

        lobby.set(ctrl.state.clone());
        screen.set(Screen::Lobby);

        match lobby_loop(&mut ctrl, &mut rx, &mut lobby, &pick_save).await {
            LobbyLoopExit::SignedOut => {}
            LobbyLoopExit::Disconnected => {
                conn_error.set("Connection lost.".to_string());
            }
        }
        // Dropping the controller closes the connection and releases
        // every subscription with it.
    }
}
