//! Quest model and the claim records that complete quests.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What the user must do to make a quest claimable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionType {
    Mint,
    LinkBasename,
    LinkSocial,
    /// Action types this server has no predicate for
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::Mint => "MINT",
            ActionType::LinkBasename => "LINK_BASENAME",
            ActionType::LinkSocial => "LINK_SOCIAL",
            ActionType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "MINT" => ActionType::Mint,
            "LINK_BASENAME" => ActionType::LinkBasename,
            "LINK_SOCIAL" => ActionType::LinkSocial,
            other => ActionType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ActionType::parse(&s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Incomplete,
    Claimable,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub action_type: ActionType,
    pub reward_amount: i64,
    pub status: QuestStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuestRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub quest_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuestResponse {
    pub quest_id: i64,
    pub status: QuestStatus,
    pub reward_amount: i64,
    pub total_points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub address: String,
    pub total_points: i64,
}
