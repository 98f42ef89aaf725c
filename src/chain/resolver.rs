//! Card and social link resolution on top of [`CardContract`].

use std::collections::BTreeMap;

use ethers::types::{Address, U256};
use futures::future::join_all;

use super::{decode_token_uri, CardContract, ChainError};
use crate::models::OnChainCardMetadata;

/// Social keys the contract stores, in matching priority order.
pub const SOCIAL_KEYS: [&str; 6] = ["x", "farcaster", "website", "github", "linkedin", "basename"];

/// A minted card as read from chain.
#[derive(Debug, Clone)]
pub struct ResolvedCard {
    pub token_id: U256,
    /// `None` when the token URI could not be decoded
    pub metadata: Option<OnChainCardMetadata>,
}

/// Read the card minted by `owner`. `Ok(None)` means nothing is minted.
pub async fn resolve_card(
    contract: &dyn CardContract,
    owner: Address,
) -> Result<Option<ResolvedCard>, ChainError> {
    let token_id = contract.token_id_of(owner).await?;
    if token_id.is_zero() {
        return Ok(None);
    }

    let uri = contract.token_uri(token_id).await?;
    let metadata = decode_token_uri(&uri);
    if metadata.is_none() {
        tracing::warn!(owner = ?owner, %token_id, "Card metadata could not be decoded");
    }

    Ok(Some(ResolvedCard { token_id, metadata }))
}

/// Read every social key of `token_id` concurrently. A key whose read fails
/// resolves to an empty string.
pub async fn resolve_socials(
    contract: &dyn CardContract,
    token_id: U256,
) -> BTreeMap<String, String> {
    let reads = SOCIAL_KEYS.iter().map(|key| async move {
        let value = match contract.get_social(token_id, key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%token_id, key, "getSocial failed: {}", e);
                String::new()
            }
        };
        (key.to_string(), value)
    });

    join_all(reads).await.into_iter().collect()
}
