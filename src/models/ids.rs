//! Player identity.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// A player's platform identity (Minecraft UUID).
///
/// Values that parse as a UUID are stored in lowercase hyphenated form, so the
/// hyphenated and simple spellings of the same identity compare equal. Anything
/// else is kept as trimmed lowercase text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlayerUuid(String);

impl PlayerUuid {
    /// Create a canonical PlayerUuid from raw text.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Uuid::parse_str(trimmed) {
            Ok(uuid) => Self(uuid.hyphenated().to_string()),
            Err(_) => Self(trimmed.to_lowercase()),
        }
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity without hyphens, as used by avatar services.
    pub fn simple(&self) -> String {
        self.0.replace('-', "")
    }
}

impl<'de> Deserialize<'de> for PlayerUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

impl fmt::Display for PlayerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerUuid({})", self.0)
    }
}

impl From<String> for PlayerUuid {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for PlayerUuid {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPHENATED: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";
    const SIMPLE: &str = "069a79f444e94726a5befca90e38aaf5";

    #[test]
    fn test_simple_and_hyphenated_forms_are_equal() {
        assert_eq!(PlayerUuid::new(HYPHENATED), PlayerUuid::new(SIMPLE));
        assert_eq!(PlayerUuid::new(SIMPLE).as_str(), HYPHENATED);
    }

    #[test]
    fn test_uppercase_is_canonicalised() {
        let id = PlayerUuid::new(&HYPHENATED.to_uppercase());
        assert_eq!(id.as_str(), HYPHENATED);
    }

    #[test]
    fn test_simple_form() {
        assert_eq!(PlayerUuid::new(HYPHENATED).simple(), SIMPLE);
    }

    #[test]
    fn test_non_uuid_text_is_kept() {
        let id = PlayerUuid::from("  Player-A ");
        assert_eq!(id.as_str(), "player-a");
    }

    #[test]
    fn test_deserialize_canonicalises() {
        let id: PlayerUuid = serde_json::from_str(&format!("\"{}\"", SIMPLE)).unwrap();
        assert_eq!(id.as_str(), HYPHENATED);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", HYPHENATED));
    }

    #[test]
    fn test_display_and_debug() {
        let id = PlayerUuid::from("abc");
        assert_eq!(format!("{}", id), "abc");
        assert!(format!("{:?}", id).contains("abc"));
    }
}
