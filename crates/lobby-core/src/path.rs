//! Database paths.
//!
//! Remote data lives in a hierarchical key-value tree addressed by
//! slash-separated paths: `/games`, `/games/{id}`, `/participants/{id}`.
//! [`DbPath`] keeps paths in one normalized form (leading `/`, no trailing
//! `/`) so they work as routing keys for subscription dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a single database key.
pub const MAX_KEY_LEN: usize = 64;

/// Length of generated game keys.
const GENERATED_KEY_LEN: usize = 12;

/// Errors produced when parsing a [`DbPath`] from a string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The input did not start with `/`.
    #[error("path must start with '/'")]
    MissingRoot,

    /// The input had no segments (`"/"` or empty).
    #[error("path has no segments")]
    Empty,

    /// A segment failed key validation.
    #[error("invalid key {0:?}")]
    InvalidKey(String),
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

/// Validate a database key (one path segment).
///
/// Keys must be non-empty, at most [`MAX_KEY_LEN`] characters, and contain
/// only ASCII alphanumerics, `-` and `_`.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LEN {
        return Err(format!("Key must be at most {MAX_KEY_LEN} characters"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Key may only contain letters, digits, '-' and '_'".to_string());
    }
    Ok(())
}

/// Generate a random key for a new game node (12 lowercase alphanumerics).
///
/// The wire protocol has no server-assigned push keys, so clients allocate
/// ids themselves before writing the node.
pub fn generate_key() -> String {
    use rand::RngExt;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let bytes: [u8; GENERATED_KEY_LEN] = rng.random();
    bytes
        .iter()
        .map(|b| CHARSET[(*b as usize) % CHARSET.len()] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// DbPath
// ---------------------------------------------------------------------------

/// A normalized database path.
///
/// Construct via the well-known builders ([`DbPath::games`],
/// [`DbPath::game`], …) or [`DbPath::parse`] for external input. Builders
/// trust their inputs; `parse` validates every segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbPath(String);

impl DbPath {
    /// Parse and validate a path string.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let rest = input.strip_prefix('/').ok_or(PathError::MissingRoot)?;
        if rest.is_empty() {
            return Err(PathError::Empty);
        }
        for segment in rest.split('/') {
            validate_key(segment).map_err(|_| PathError::InvalidKey(segment.to_string()))?;
        }
        Ok(Self(format!("/{rest}")))
    }

    /// The `/games` collection.
    pub fn games() -> Self {
        Self("/games".to_string())
    }

    /// The node of one game: `/games/{id}`.
    pub fn game(id: &str) -> Self {
        Self::games().child(id)
    }

    /// A game's participants array: `/games/{id}/participants`.
    pub fn game_participants(id: &str) -> Self {
        Self::game(id).child("participants")
    }

    /// A game's status field: `/games/{id}/status`.
    pub fn game_status(id: &str) -> Self {
        Self::game(id).child("status")
    }

    /// One participant membership node: `/participants/{user_id}`.
    pub fn participant(user_id: &str) -> Self {
        Self(format!("/participants/{user_id}"))
    }

    /// Append a child segment.
    pub fn child(&self, key: &str) -> Self {
        Self(format!("{}/{key}", self.0))
    }

    /// The last segment of the path.
    pub fn key(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The path one level up, or `None` for a root-level collection.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            return None;
        }
        Some(Self(self.0[..idx].to_string()))
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_keys() {
        assert!(validate_key("abc123").is_ok());
        assert!(validate_key("A").is_ok());
        assert!(validate_key("user-42_x").is_ok());
        assert!(validate_key(&"a".repeat(MAX_KEY_LEN)).is_ok());
    }

    #[test]
    fn invalid_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key(&"a".repeat(MAX_KEY_LEN + 1)).is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key("dot.ted").is_err());
        assert!(validate_key("sla/sh").is_err());
    }

    #[test]
    fn generated_keys_are_valid() {
        let key = generate_key();
        assert_eq!(key.len(), 12);
        assert!(validate_key(&key).is_ok());
        assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn parse_accepts_normalized_paths() {
        assert_eq!(DbPath::parse("/games").unwrap(), DbPath::games());
        assert_eq!(DbPath::parse("/games/g1").unwrap(), DbPath::game("g1"));
        assert_eq!(
            DbPath::parse("/participants/alice").unwrap(),
            DbPath::participant("alice")
        );
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert_eq!(DbPath::parse("games"), Err(PathError::MissingRoot));
        assert_eq!(DbPath::parse("/"), Err(PathError::Empty));
        assert_eq!(DbPath::parse(""), Err(PathError::MissingRoot));
        assert_eq!(
            DbPath::parse("/games//g1"),
            Err(PathError::InvalidKey(String::new()))
        );
        assert_eq!(
            DbPath::parse("/games/bad.key"),
            Err(PathError::InvalidKey("bad.key".to_string()))
        );
    }

    #[test]
    fn key_and_parent() {
        let path = DbPath::game("g1");
        assert_eq!(path.key(), "g1");
        assert_eq!(path.parent(), Some(DbPath::games()));
        assert_eq!(DbPath::games().parent(), None);
        assert_eq!(DbPath::game_status("g1").as_str(), "/games/g1/status");
        assert_eq!(
            DbPath::game_participants("g1").parent(),
            Some(DbPath::game("g1"))
        );
    }
}
