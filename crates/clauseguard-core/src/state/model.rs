//! Persisted preference models.
//!
//! Contains the keys and value types the engine keeps in its
//! `PersistenceAdapter`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key under which the active session id is stored. Short-lived.
pub const SESSION_ID_KEY: &str = "session_id";

/// Key under which the user's role preference is stored. Long-lived.
pub const USER_ROLE_KEY: &str = "user_role";

/// Role the current user works in.
///
/// Expert users may override the compliance verdict of any term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Regular,
    Expert,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Expert => "expert",
        }
    }

    /// Parses a stored value, falling back to `Regular` for anything unknown.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "expert" => Ok(Self::Expert),
            other => Err(format!("unknown user role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_string() {
        assert_eq!("expert".parse::<UserRole>(), Ok(UserRole::Expert));
        assert_eq!(UserRole::Expert.to_string(), "expert");
    }

    #[test]
    fn test_unknown_stored_role_falls_back() {
        assert_eq!(UserRole::from_stored(Some("admin")), UserRole::Regular);
        assert_eq!(UserRole::from_stored(None), UserRole::Regular);
        assert_eq!(UserRole::from_stored(Some(" Expert ")), UserRole::Expert);
    }
}
