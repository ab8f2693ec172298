//! User profile records.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A persisted user profile.
///
/// The server owns these records; the client holds a read-only snapshot per
/// session. Fields beyond `uid` and `username` are opaque to this layer and
/// round-trip through `extra`.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Provider-assigned user id, shared with the auth identity.
    uid: String,
    /// Chosen display name; the empty string marks a profile the user has
    /// not finished setting up.
    username: String,
    /// Profile fields this layer does not interpret.
    #[serde(flatten)]
    #[new(default)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl UserData {
    /// Whether the user still has to complete their profile.
    pub fn incomplete_profile(&self) -> bool {
        self.username.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_profile_iff_empty_username() {
        assert!(UserData::new("u1".to_string(), String::new()).incomplete_profile());
        assert!(!UserData::new("u1".to_string(), "bee".to_string()).incomplete_profile());
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let json = r#"{"uid":"u1","username":"bee","eloRating":1200}"#;
        let user: UserData = serde_json::from_str(json).expect("Parse failed");
        assert_eq!(user.uid(), "u1");
        assert_eq!(user.extra().get("eloRating"), Some(&serde_json::json!(1200)));

        let back = serde_json::to_value(&user).expect("Serialize failed");
        assert_eq!(back.get("eloRating"), Some(&serde_json::json!(1200)));
    }
}
