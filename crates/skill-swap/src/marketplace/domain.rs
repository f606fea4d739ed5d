use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Identifier wrapper for skills listed on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub String);

/// Identifier wrapper for swap requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapRequestId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SwapRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named capability attached to exactly one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Skill as supplied by a client; an omitted id is generated on save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillInput {
    #[serde(default)]
    pub id: Option<SkillId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Stored directory profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub skills_offered: Vec<Skill>,
    pub skills_requested: Vec<Skill>,
    pub availability: String,
    pub profile_public: bool,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn offered_skill(&self, id: &SkillId) -> Option<&Skill> {
        self.skills_offered.iter().find(|skill| &skill.id == id)
    }

    /// Whether `id` appears in either skill list.
    pub fn lists_skill(&self, id: &SkillId) -> bool {
        self.skills_offered
            .iter()
            .chain(&self.skills_requested)
            .any(|skill| &skill.id == id)
    }
}

/// Display fields of a user embedded into swap requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Payload accepted by `POST /auth/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub skills_offered: Vec<SkillInput>,
    #[serde(default)]
    pub skills_requested: Vec<SkillInput>,
    #[serde(default)]
    pub availability: String,
    #[serde(default = "default_public")]
    pub profile_public: bool,
}

fn default_public() -> bool {
    true
}

/// Partial profile edit; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub profile_public: Option<bool>,
    #[serde(default)]
    pub skills_offered: Option<Vec<SkillInput>>,
    #[serde(default)]
    pub skills_requested: Option<Vec<SkillInput>>,
}

/// Lifecycle state of a swap request. Everything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl SwapStatus {
    pub const ALL: [SwapStatus; 4] = [
        SwapStatus::Pending,
        SwapStatus::Accepted,
        SwapStatus::Rejected,
        SwapStatus::Cancelled,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == raw)
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, SwapStatus::Pending)
    }

    pub const fn partition(self) -> SwapPartition {
        match self {
            SwapStatus::Pending => SwapPartition::Pending,
            SwapStatus::Accepted => SwapPartition::Active,
            SwapStatus::Rejected | SwapStatus::Cancelled => SwapPartition::History,
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Buckets used by the "manage swaps" view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapPartition {
    Pending,
    Active,
    History,
}

/// A proposed exchange of one offered skill for one requested skill.
///
/// Only `status` changes after creation; user and skill fields are snapshots
/// taken when the request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: SwapRequestId,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
    pub offered_skill: Skill,
    pub requested_skill: Skill,
    pub message: String,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
}

impl SwapRequest {
    pub fn involves(&self, user: &UserId) -> bool {
        &self.from_user.id == user || &self.to_user.id == user
    }

    pub fn direction_for(&self, user: &UserId) -> Option<SwapDirection> {
        if &self.from_user.id == user {
            Some(SwapDirection::Outgoing)
        } else if &self.to_user.id == user {
            Some(SwapDirection::Incoming)
        } else {
            None
        }
    }
}

/// Payload accepted by `POST /requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSubmission {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub offered_skill_id: SkillId,
    pub requested_skill_id: SkillId,
    pub message: String,
}

/// Whether a request was sent or received from a given user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapDirection {
    Incoming,
    Outgoing,
}
