//! Collection API endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CollectedCard, Collection, CreateCollectionRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionQuery {
    pub card_id: Option<i64>,
}

/// Collected cards of one card, or every edge when no card is given.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CollectionList {
    Cards(Vec<CollectedCard>),
    Edges(Vec<Collection>),
}

/// GET /api/collections - List collections.
pub async fn list_collections(
    State(state): State<AppState>,
    Query(params): Query<CollectionQuery>,
) -> ApiResult<CollectionList> {
    let list = match params.card_id {
        Some(card_id) => CollectionList::Cards(state.repo.list_collected_cards(card_id).await?),
        None => CollectionList::Edges(state.repo.list_collections().await?),
    };
    success(list)
}

/// POST /api/collections - Collect a card.
pub async fn create_collection(
    State(state): State<AppState>,
    Json(request): Json<CreateCollectionRequest>,
) -> ApiResult<Collection> {
    let (Some(card_id), Some(collected_card_id)) = (request.card_id, request.collected_card_id)
    else {
        return Err(AppError::Validation(
            "cardId and collectedCardId are required".to_string(),
        ));
    };

    if card_id == collected_card_id {
        return Err(AppError::Validation(
            "A card cannot collect itself".to_string(),
        ));
    }

    success(
        state
            .repo
            .create_collection(card_id, collected_card_id)
            .await?,
    )
}
