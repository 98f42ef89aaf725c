//! Programs (bounties and projects) published by a card owner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Bounty,
    Project,
}

impl ProgramType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::Bounty => "bounty",
            ProgramType::Project => "project",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bounty" => Some(ProgramType::Bounty),
            "project" => Some(ProgramType::Project),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_card_id: i64,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgramRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_card_id: Option<i64>,
    /// Parsed by the handler; unknown values are a validation error
    #[serde(default, rename = "type")]
    pub program_type: Option<String>,
}
