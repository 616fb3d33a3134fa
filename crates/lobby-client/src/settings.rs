//! Client settings.
//!
//! Carried across runs so the connect screen comes up pre-filled and the
//! save picker opens in the right directory. The storage itself is a
//! platform concern; the desktop crate provides the on-disk
//! implementation and tests use an in-memory one.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Database service URL used until the user picks another.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8080/db";

/// Settings persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Database service URL.
    pub server_url: String,
    /// User id presented in the auth handshake.
    pub user_id: String,
    /// Directory the save-file picker starts in.
    pub saves_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            user_id: String::new(),
            saves_dir: None,
        }
    }
}

/// Storage for [`ClientSettings`].
pub trait SettingsStore {
    /// Load previously saved settings, or defaults when none exist.
    fn load(&self) -> ClientSettings;
    /// Persist the settings. Failures are logged, never fatal.
    fn save(&self, settings: &ClientSettings);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings: ClientSettings = serde_json::from_str(r#"{"user_id":"alice"}"#).unwrap();
        assert_eq!(settings.user_id, "alice");
        assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
        assert_eq!(settings.saves_dir, None);
    }

    #[test]
    fn round_trips_through_json() {
        let settings = ClientSettings {
            server_url: "ws://example.net/db".to_string(),
            user_id: "bob".to_string(),
            saves_dir: Some(PathBuf::from("/saves")),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<ClientSettings>(&json).unwrap(), settings);
    }
}
