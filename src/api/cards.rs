//! Card API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Card, CreateCardRequest, UpdateCardRequest};
use crate::AppState;

/// GET /api/cards - List all cards.
pub async fn list_cards(State(state): State<AppState>) -> ApiResult<Vec<Card>> {
    success(state.repo.list_cards().await?)
}

/// GET /api/card/{address} - Get the card owned by an address.
pub async fn get_card(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Card> {
    match state.repo.get_card_by_address(&address).await? {
        Some(card) => success(card),
        None => Err(AppError::NotFound(format!("Card {} not found", address))),
    }
}

/// POST /api/cards - Create a card after mint.
pub async fn create_card(
    State(state): State<AppState>,
    Json(request): Json<CreateCardRequest>,
) -> ApiResult<Card> {
    if request.address.trim().is_empty() {
        return Err(AppError::Validation("Address is required".to_string()));
    }

    success(state.repo.create_card(&request).await?)
}

/// PUT /api/card/{address} - Edit a card's profile.
pub async fn update_card(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(request): Json<UpdateCardRequest>,
) -> ApiResult<Card> {
    success(state.repo.update_card(&address, &request).await?)
}

/// DELETE /api/card/{address} - Delete a card.
pub async fn delete_card(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_card(&address).await?;
    success(())
}
