//! One row in a game's participant list.

use dioxus::prelude::*;

#[component]
pub fn ParticipantRow(user_id: String, is_host: bool, is_you: bool) -> Element {
    let class = if is_you {
        "game-participant you"
    } else {
        "game-participant"
    };

    rsx! {
        div { class: "{class}",
            span { class: "participant-id", "{user_id}" }
            if is_host {
                span { class: "participant-badge", "host" }
            }
        }
    }
}
