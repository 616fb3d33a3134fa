//! One game's panel: header with name, player count, status and the
//! role-derived action buttons, plus the participant list.

use dioxus::prelude::*;
use lobby_client::state::LobbyState;
use lobby_core::game::GameAction;

use super::participant_row;
use crate::UiMessage;

#[component]
pub fn GamePanel(state: Signal<LobbyState>, id: String) -> Element {
    let lobby = state.read();
    let coroutine = use_coroutine_handle::<UiMessage>();

    let Some(detail) = lobby.game(&id) else {
        return rsx! {};
    };
    let title = detail.title().to_string();
    let count = detail.participants.len();
    let status = detail.status.to_string();
    let actions = lobby.actions_for(&id);

    rsx! {
        div { class: "game",
            div { class: "game-header",
                div { class: "game-name", "{title}" }
                div { class: "game-participant-count", "({count} players)" }
                div { class: "game-status", "{status}" }
                div { class: "game-options",
                    for action in actions {
                        button {
                            key: "{action.id()}",
                            id: action.id(),
                            class: "game-option",
                            onclick: {
                                let game_id = id.clone();
                                move |_| coroutine.send(action_message(action, &game_id))
                            },
                            {action.label()}
                        }
                    }
                }
            }
            div { class: "game-details",
                div { class: "game-participant-list",
                    for participant in detail.participants.iter() {
                        participant_row::ParticipantRow {
                            key: "{participant}",
                            user_id: participant.clone(),
                            is_host: *participant == detail.host,
                            is_you: *participant == lobby.user_id,
                        }
                    }
                }
            }
        }
    }
}

fn action_message(action: GameAction, game_id: &str) -> UiMessage {
    let game_id = game_id.to_string();
    match action {
        GameAction::Start => UiMessage::StartGame { game_id },
        GameAction::Cancel => UiMessage::CancelGame { game_id },
        GameAction::Leave => UiMessage::LeaveGame { game_id },
        GameAction::Join => UiMessage::JoinGame { game_id },
    }
}
