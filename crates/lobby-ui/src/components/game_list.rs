//! Lobby screen: create-game bar, one panel per visible game, event feed.
//!
//! Composes the per-game panels and the feed into the full lobby view.
//! Mirrors [`super::connect_screen`] so the root app only routes between
//! the two screens.

use dioxus::prelude::*;
use lobby_client::state::LobbyState;

use super::{event_log, game_panel};
use crate::UiMessage;

#[component]
pub fn GameList(state: Signal<LobbyState>) -> Element {
    let lobby = state.read();
    let mut new_name = use_signal(String::new);
    let coroutine = use_coroutine_handle::<UiMessage>();

    let user_id = lobby.user_id.clone();

    rsx! {
        div { class: "lobby-screen",
            div { class: "lobby-header",
                span { class: "lobby-user", "{user_id}" }
                button {
                    class: "btn-sign-out",
                    onclick: move |_| coroutine.send(UiMessage::SignOut),
                    "Sign out"
                }
            }

            div { class: "create-bar",
                input {
                    r#type: "text",
                    placeholder: "New game name",
                    value: "{new_name}",
                    oninput: move |e| new_name.set(e.value()),
                }
                button {
                    class: "btn-create",
                    onclick: move |_| {
                        let name = new_name.read().trim().to_string();
                        if !name.is_empty() {
                            coroutine.send(UiMessage::CreateGame { name });
                            new_name.set(String::new());
                        }
                    },
                    "Create game"
                }
            }

            div { class: "game-list",
                if lobby.game_ids.is_empty() {
                    p { class: "game-list-empty", "No games yet." }
                }
                for id in lobby.game_ids.iter() {
                    game_panel::GamePanel { key: "{id}", state, id: id.clone() }
                }
            }

            div { class: "event-log-pane",
                event_log::EventLog { state }
            }
        }
    }
}
