//! Collection edges between cards.

use serde::{Deserialize, Serialize};

use super::Card;

/// `cardId` has collected `collectedCardId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub card_id: i64,
    pub collected_card_id: i64,
    pub created_at: String,
}

/// A collected card together with the edge that links it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedCard {
    pub collection_id: i64,
    pub collected_at: String,
    pub card: Card,
}

/// Request body for collecting a card.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    #[serde(default)]
    pub card_id: Option<i64>,
    #[serde(default)]
    pub collected_card_id: Option<i64>,
}
