//! Decoding of the inline `tokenURI` metadata document.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::models::OnChainCardMetadata;

/// The contract returns metadata as an inline base64 JSON document.
pub const TOKEN_URI_PREFIX: &str = "data:application/json;base64,";

const IPFS_SCHEME: &str = "ipfs://";

/// Decode a `data:application/json;base64,...` token URI.
///
/// Returns `None` on a foreign prefix, invalid base64 or a payload that is
/// not a metadata object. There is no retry and no fallback source.
pub fn decode_token_uri(uri: &str) -> Option<OnChainCardMetadata> {
    let Some(payload) = uri.strip_prefix(TOKEN_URI_PREFIX) else {
        tracing::warn!("Token URI has unexpected prefix: {:.48}", uri);
        return None;
    };

    let bytes = match STANDARD.decode(payload.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Token URI payload is not base64: {}", e);
            return None;
        }
    };

    match serde_json::from_slice::<OnChainCardMetadata>(&bytes) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!("Token URI payload is not card metadata: {}", e);
            None
        }
    }
}

/// Rewrite an `ipfs://` URI onto an HTTP gateway. Other URIs pass through.
pub fn resolve_ipfs_uri(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(path) => format!(
            "{}/{}",
            gateway.trim_end_matches('/'),
            path.strip_prefix("ipfs/").unwrap_or(path)
        ),
        None => uri.to_string(),
    }
}
