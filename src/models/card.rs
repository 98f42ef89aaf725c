//! Card model matching the Mini App's card record.

use serde::{Deserialize, Serialize};

/// A user's identity card, optionally backed by a minted token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub nickname: String,
    pub bio: String,
    #[serde(rename = "imageURI")]
    pub image_uri: String,
    pub basename: String,
    pub role: String,
    pub skills: Vec<String>,
    /// Lowercased wallet address, unique across cards
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<i64>,
    /// Profile picture the user had before minting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a card after mint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, rename = "imageURI")]
    pub image_uri: String,
    #[serde(default)]
    pub basename: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub token_id: Option<i64>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Request body for a profile edit. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, rename = "imageURI")]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub basename: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub token_id: Option<i64>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Addresses are hex and case-insensitive, with an optional `0x`. Rows are
/// keyed on the lowercase `0x`-prefixed form.
pub fn normalize_address(address: &str) -> String {
    let lower = address.trim().to_ascii_lowercase();
    let hex = lower.strip_prefix("0x").unwrap_or(&lower);
    format!("0x{}", hex)
}
