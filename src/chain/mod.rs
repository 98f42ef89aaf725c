//! Read access to the BaseCard contract.
//!
//! Handlers depend on [`CardContract`] rather than on a provider so tests can
//! substitute an in-memory contract.

mod metadata;
mod resolver;

pub use metadata::*;
pub use resolver::*;

use std::sync::Arc;
use std::time::Duration;

use ethers::contract::abigen;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, U256};

use crate::retry::{is_user_rejection_message, Retryable};

/// Polls before giving up on the RPC endpoint reporting the expected chain.
pub const CHAIN_POLL_ATTEMPTS: u32 = 30;
pub const CHAIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

abigen!(
    BaseCardContract,
    r#"[
        function tokenIdOf(address owner) external view returns (uint256)
        function tokenURI(uint256 tokenId) external view returns (string)
        function getSocial(uint256 tokenId, string key) external view returns (string)
    ]"#
);

/// Errors from contract reads.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Card contract is not configured")]
    NotConfigured,

    #[error("RPC call failed: {message}")]
    Rpc { code: Option<i64>, message: String },

    #[error("Chain {expected} not reached, last seen {last_seen:?}")]
    ChainTimeout { expected: u64, last_seen: Option<u64> },
}

impl ChainError {
    pub fn rpc(message: impl Into<String>) -> Self {
        ChainError::Rpc {
            code: None,
            message: message.into(),
        }
    }
}

impl Retryable for ChainError {
    fn is_user_rejection(&self) -> bool {
        match self {
            ChainError::Rpc { code, message } => {
                *code == Some(4001) || is_user_rejection_message(message)
            }
            _ => false,
        }
    }
}

/// View functions of the BaseCard contract consumed by the backend.
#[async_trait::async_trait]
pub trait CardContract: Send + Sync {
    /// Token owned by `owner`, zero when nothing is minted.
    async fn token_id_of(&self, owner: Address) -> Result<U256, ChainError>;

    async fn token_uri(&self, token_id: U256) -> Result<String, ChainError>;

    async fn get_social(&self, token_id: U256, key: &str) -> Result<String, ChainError>;

    /// Chain the underlying RPC endpoint serves.
    async fn chain_id(&self) -> Result<u64, ChainError>;
}

/// JSON-RPC backed contract.
pub struct EthersCardContract {
    provider: Arc<Provider<Http>>,
    contract: BaseCardContract<Provider<Http>>,
}

impl EthersCardContract {
    pub fn connect(rpc_url: &str, contract_address: &str) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::rpc(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
        let provider = Arc::new(provider);
        let address = parse_address(contract_address)?;

        Ok(Self {
            contract: BaseCardContract::new(address, provider.clone()),
            provider,
        })
    }
}

#[async_trait::async_trait]
impl CardContract for EthersCardContract {
    async fn token_id_of(&self, owner: Address) -> Result<U256, ChainError> {
        self.contract
            .token_id_of(owner)
            .call()
            .await
            .map_err(|e| ChainError::rpc(e.to_string()))
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, ChainError> {
        self.contract
            .token_uri(token_id)
            .call()
            .await
            .map_err(|e| ChainError::rpc(e.to_string()))
    }

    async fn get_social(&self, token_id: U256, key: &str) -> Result<String, ChainError> {
        self.contract
            .get_social(token_id, key.to_string())
            .call()
            .await
            .map_err(|e| ChainError::rpc(e.to_string()))
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| ChainError::rpc(e.to_string()))?;
        Ok(id.as_u64())
    }
}

/// Stand-in used when no contract address is configured.
pub struct DisabledContract;

#[async_trait::async_trait]
impl CardContract for DisabledContract {
    async fn token_id_of(&self, _owner: Address) -> Result<U256, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn token_uri(&self, _token_id: U256) -> Result<String, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn get_social(&self, _token_id: U256, _key: &str) -> Result<String, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        Err(ChainError::NotConfigured)
    }
}

/// Parse a hex wallet or contract address.
pub fn parse_address(address: &str) -> Result<Address, ChainError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|_| ChainError::InvalidAddress(address.to_string()))
}

/// Wait until the contract's RPC endpoint reports `expected` as its chain id.
pub async fn await_chain_id(
    contract: &dyn CardContract,
    expected: u64,
    attempts: u32,
    interval: Duration,
) -> Result<(), ChainError> {
    let mut last_seen = None;

    for attempt in 1..=attempts {
        match contract.chain_id().await {
            Ok(id) if id == expected => {
                tracing::info!(chain_id = id, attempt, "RPC endpoint on expected chain");
                return Ok(());
            }
            Ok(id) => {
                tracing::debug!(chain_id = id, expected, attempt, "Waiting for chain");
                last_seen = Some(id);
            }
            Err(ChainError::NotConfigured) => return Err(ChainError::NotConfigured),
            Err(e) => tracing::debug!(attempt, "Chain id lookup failed: {}", e),
        }

        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(ChainError::ChainTimeout {
        expected,
        last_seen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports the wrong chain until `switch_after` lookups have happened.
    struct SwitchingChain {
        calls: AtomicU32,
        switch_after: u32,
    }

    #[async_trait::async_trait]
    impl CardContract for SwitchingChain {
        async fn token_id_of(&self, _owner: Address) -> Result<U256, ChainError> {
            Ok(U256::zero())
        }

        async fn token_uri(&self, _token_id: U256) -> Result<String, ChainError> {
            Ok(String::new())
        }

        async fn get_social(&self, _token_id: U256, _key: &str) -> Result<String, ChainError> {
            Ok(String::new())
        }

        async fn chain_id(&self) -> Result<u64, ChainError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(if n > self.switch_after { 8453 } else { 1 })
        }
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0x000000000000000000000000000000000000dEaD").is_ok());
        assert!(matches!(
            parse_address("not-an-address"),
            Err(ChainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_rejection_classification() {
        let rejected = ChainError::Rpc {
            code: Some(4001),
            message: "whatever".into(),
        };
        assert!(rejected.is_user_rejection());
        assert!(ChainError::rpc("User rejected the request.").is_user_rejection());
        assert!(!ChainError::rpc("execution reverted").is_user_rejection());
        assert!(!ChainError::NotConfigured.is_user_rejection());
    }

    #[tokio::test]
    async fn test_await_chain_id_polls_until_switch() {
        let chain = SwitchingChain {
            calls: AtomicU32::new(0),
            switch_after: 3,
        };
        await_chain_id(&chain, 8453, CHAIN_POLL_ATTEMPTS, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(chain.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_await_chain_id_times_out() {
        let chain = SwitchingChain {
            calls: AtomicU32::new(0),
            switch_after: u32::MAX,
        };
        let err = await_chain_id(&chain, 8453, 5, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::ChainTimeout {
                expected: 8453,
                last_seen: Some(1)
            }
        ));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_disabled_contract_reports_not_configured() {
        let err = await_chain_id(&DisabledContract, 8453, 3, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::NotConfigured));
    }
}
