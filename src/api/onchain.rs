//! On-chain card lookup.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use serde::Serialize;

use super::{success, ApiResult};
use crate::chain::{parse_address, resolve_card, resolve_ipfs_uri, resolve_socials};
use crate::errors::AppError;
use crate::models::OnChainCardMetadata;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainCard {
    /// Decimal string; token ids are uint256
    pub token_id: String,
    pub metadata: Option<OnChainCardMetadata>,
    pub socials: BTreeMap<String, String>,
}

/// GET /api/onchain/{address} - Read the card minted by an address.
pub async fn get_onchain_card(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<OnChainCard> {
    let owner = parse_address(&address)?;

    let card = resolve_card(state.contract.as_ref(), owner)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No card minted for {}", address)))?;

    let socials = resolve_socials(state.contract.as_ref(), card.token_id).await;

    let metadata = card.metadata.map(|mut metadata| {
        metadata.image = resolve_ipfs_uri(&metadata.image, &state.config.ipfs_gateway);
        metadata
    });

    success(OnChainCard {
        token_id: card.token_id.to_string(),
        metadata,
        socials,
    })
}
