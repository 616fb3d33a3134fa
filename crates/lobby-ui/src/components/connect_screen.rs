//! Connect screen: user id, server address, connect button.

use dioxus::prelude::*;
use lobby_core::path::validate_key;

use crate::UiMessage;

/// Props for the connect screen.
///
/// `default_server` and `default_user` pre-fill the form, typically from
/// the persisted settings of a previous run. `error` mirrors connection
/// failures reported by the coroutine.
#[component]
pub fn ConnectScreen(
    error: Signal<String>,
    #[props(default = lobby_client::settings::DEFAULT_SERVER_URL.to_string())]
    default_server: String,
    #[props(default = String::new())] default_user: String,
) -> Element {
    let mut user_id = use_signal(move || default_user.clone());
    let mut server_url = use_signal(move || default_server.clone());
    let mut validation_error = use_signal(String::new);
    let coroutine = use_coroutine_handle::<UiMessage>();

    let mut on_submit = move || {
        let user = user_id.read().trim().to_string();
        let server = server_url.read().trim().to_string();

        // Client-side validation
        if user.is_empty() {
            validation_error.set("User id cannot be empty".to_string());
            return;
        }
        if let Err(e) = validate_key(&user) {
            validation_error.set(e);
            return;
        }
        if server.is_empty() {
            validation_error.set("Server address cannot be empty".to_string());
            return;
        }

        validation_error.set(String::new());
        coroutine.send(UiMessage::Connect {
            server_url: server,
            user_id: user,
        });
    };

    let err = error.read().clone();
    let val_err = validation_error.read().clone();

    rsx! {
        div { class: "connect-screen",
            div { class: "connect-card",
                h1 { class: "connect-title", "Play by Cloud" }

                div { class: "connect-fields",
                    div { class: "field",
                        label { "User id" }
                        input {
                            r#type: "text",
                            placeholder: "e.g. alice",
                            value: "{user_id}",
                            oninput: move |e| user_id.set(e.value()),
                        }
                        p { class: "field-hint", "Letters, digits, dashes and underscores" }
                    }
                    div { class: "field",
                        label { "Server address" }
                        input {
                            r#type: "text",
                            value: "{server_url}",
                            oninput: move |e| server_url.set(e.value()),
                        }
                    }
                }

                if !val_err.is_empty() {
                    p { class: "form-error", "{val_err}" }
                }
                if !err.is_empty() {
                    p { class: "form-error", "{err}" }
                }

                button {
                    class: "btn-connect",
                    onclick: move |_| on_submit(),
                    "Connect"
                }
            }
        }
    }
}
