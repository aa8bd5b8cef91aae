//! Member model: a rotation participant and their running counters.

use serde::{Deserialize, Serialize};

/// A member of the dinner rotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Store-assigned identifier.
    pub id: i64,
    /// Slack user ID.
    pub slack_uid: String,
    /// Real name fetched from the Slack profile.
    pub full_name: String,
    /// Number of meals eaten; never negative.
    pub meals_eaten: i64,
    /// Number of meals cooked; never negative.
    pub meals_cooked: i64,
    /// Whether the member organises the rotation.
    pub leader: bool,
}

/// Fields required to insert a member. Counters start at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    /// Slack user ID.
    pub slack_uid: String,
    /// Real name fetched from the Slack profile.
    pub full_name: String,
    /// Whether the member organises the rotation.
    pub leader: bool,
}

impl NewMember {
    /// A non-leader member with the given identity.
    #[must_use]
    pub fn new(slack_uid: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            slack_uid: slack_uid.into(),
            full_name: full_name.into(),
            leader: false,
        }
    }
}

/// Partial update applied by `MemberStore::update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberUpdate {
    /// New display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Absolute meals-eaten value.
    #[serde(default)]
    pub meals_eaten: Option<i64>,
    /// Absolute meals-cooked value.
    #[serde(default)]
    pub meals_cooked: Option<i64>,
    /// Leader flag.
    #[serde(default)]
    pub leader: Option<bool>,
}
