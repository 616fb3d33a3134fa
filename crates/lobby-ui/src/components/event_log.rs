//! Event feed: scrollable list of lobby events.

use dioxus::prelude::*;
use lobby_client::state::{LobbyEvent, LobbyState, LogCategory};

#[component]
pub fn EventLog(state: Signal<LobbyState>) -> Element {
    let lobby = state.read();

    rsx! {
        div { class: "event-log",
            for event in lobby.events.iter() {
                {render_event(event)}
            }
        }
    }
}

fn render_event(event: &LobbyEvent) -> Element {
    let text = match event {
        LobbyEvent::Connected { user_id } => format!("Connected as {user_id}"),
        LobbyEvent::GameAdded { id } => format!("Game {id} appeared"),
        LobbyEvent::GameRemoved { id } => format!("Game {id} is gone"),
        LobbyEvent::GameCreated { id, name } => format!("Created \"{name}\" ({id})"),
        LobbyEvent::JoinedGame { id } => format!("Joined game {id}"),
        LobbyEvent::LeftGame { id } => format!("Left game {id}"),
        LobbyEvent::UploadRequested { file, .. } => format!("Uploading turn {file}"),
        LobbyEvent::GameCancelled { id } => format!("Cancelled game {id}"),
        LobbyEvent::WriteFailed { message } => format!("Write failed: {message}"),
        LobbyEvent::ServiceError { message } => format!("Error: {message}"),
        LobbyEvent::Disconnected => "Disconnected from server".to_string(),
        LobbyEvent::Text { text, .. } => text.clone(),
    };
    let class = category_class(event.category());

    rsx! {
        p { class: "{class}", "{text}" }
    }
}

fn category_class(cat: LogCategory) -> &'static str {
    match cat {
        LogCategory::System => "log-system",
        LogCategory::Action => "log-action",
        LogCategory::Error => "log-error",
        LogCategory::Info => "log-info",
    }
}
