//! Root application component: signals, the session coroutine, and screen routing.

use dioxus::prelude::*;

use lobby_client::settings::SettingsStore;
use lobby_client::state::LobbyState;
use lobby_core::game::{SAVE_EXTENSION, SAVE_FILTER_NAME};
use lobby_ui::app_logic::run_app_session;
use lobby_ui::components::{connect_screen, game_list};
use lobby_ui::{Screen, UiMessage};

use crate::settings::FileSettings;

const MAIN_CSS: Asset = asset!("/assets/main.css");

/// Pick a save file with the native dialog.
///
/// Starts in the remembered saves directory and remembers the directory
/// of whatever the user picks.
async fn pick_save_file() -> Option<std::path::PathBuf> {
    let store = FileSettings;
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Please select a save file")
        .add_filter(SAVE_FILTER_NAME, &[SAVE_EXTENSION]);
    if let Some(dir) = store.load().saves_dir {
        dialog = dialog.set_directory(dir);
    }

    let file = dialog.pick_file().await?;
    let path = file.path().to_path_buf();
    if let Some(parent) = path.parent() {
        let mut settings = store.load();
        settings.saves_dir = Some(parent.to_path_buf());
        store.save(&settings);
    }
    Some(path)
}

/// Root `<App>` component.
#[component]
pub fn App() -> Element {
    let screen = use_signal(|| Screen::Connect);
    let lobby = use_signal(|| LobbyState::new(""));
    let conn_error = use_signal(String::new);

    // Saved settings pre-fill the connect form.
    let saved = use_hook(|| FileSettings.load());

    // Spawn the session coroutine. Components send UiMessage via the handle.
    let _coroutine = use_coroutine(move |rx: UnboundedReceiver<UiMessage>| {
        run_app_session(rx, screen, lobby, conn_error, FileSettings, pick_save_file)
    });

    rsx! {
        document::Stylesheet { href: MAIN_CSS }
        div { class: "app-root",
            match &*screen.read() {
                Screen::Connect => rsx! {
                    connect_screen::ConnectScreen {
                        error: conn_error,
                        default_server: saved.server_url.clone(),
                        default_user: saved.user_id.clone(),
                    }
                },
                Screen::Lobby => rsx! {
                    game_list::GameList { state: lobby }
                },
            }
        }
    }
}
