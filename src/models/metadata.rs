//! Card metadata as embedded in the token URI.

use serde::{Deserialize, Serialize};

/// One `{key, value}` entry of the metadata's social link list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLink {
    pub key: String,
    pub value: String,
}

/// Decoded `tokenURI` payload. Read-only view of contract state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OnChainCardMetadata {
    pub name: String,
    pub image: String,
    pub nickname: String,
    pub role: String,
    pub bio: String,
    pub socials: Vec<SocialLink>,
}
