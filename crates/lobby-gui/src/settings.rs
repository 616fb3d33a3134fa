//! On-disk settings store.
//!
//! Settings live as JSON under the platform config directory, so the
//! connect form and the save picker remember their last values across
//! runs.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use lobby_client::settings::{ClientSettings, SettingsStore};

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("play-by-cloud");
    fs::create_dir_all(&path).ok();
    path.push("settings.json");
    path
}

/// [`SettingsStore`] backed by a JSON file.
#[derive(Clone, Copy, Default)]
pub struct FileSettings;

impl SettingsStore for FileSettings {
    fn load(&self) -> ClientSettings {
        fs::read_to_string(settings_path())
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn save(&self, settings: &ClientSettings) {
        match serde_json::to_string_pretty(settings) {
            Ok(json) => {
                if let Err(e) = fs::write(settings_path(), json) {
                    warn!("failed to write settings: {e}");
                }
            }
            Err(e) => warn!("failed to serialize settings: {e}"),
        }
    }
}
