//! Configuration module for the BaseCard backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Base mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 8453;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Client credentials and endpoints of one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: Option<String>,
    /// Server-held secret. Never sent to the browser.
    pub client_secret: Option<String>,
    pub token_url: String,
    pub profile_url: String,
}

/// OAuth providers bridged by `/api/auth/{provider}`.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub github: OAuthProviderConfig,
    pub linkedin: OAuthProviderConfig,
    pub twitter: OAuthProviderConfig,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the card registry routes
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// JSON-RPC endpoint of the chain the card contract lives on
    pub rpc_url: String,
    /// BaseCard contract address; chain reads are disabled when unset
    pub contract_address: Option<String>,
    pub chain_id: u64,
    /// Gateway used to rewrite `ipfs://` URIs
    pub ipfs_gateway: String,
    pub oauth: OAuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = non_empty_var("BASECARD_API_PSK");

        let db_path = env::var("BASECARD_DB_PATH")
            .unwrap_or_else(|_| "./data/basecard.sqlite".to_string())
            .into();

        let bind_addr = env::var("BASECARD_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid BASECARD_BIND_ADDR format");

        let log_level = env::var("BASECARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("BASECARD_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let rpc_url =
            env::var("BASECARD_RPC_URL").unwrap_or_else(|_| "https://mainnet.base.org".to_string());

        let contract_address = non_empty_var("BASECARD_CONTRACT_ADDRESS");

        let chain_id = env::var("BASECARD_CHAIN_ID")
            .ok()
            .map(|v| v.parse().expect("Invalid BASECARD_CHAIN_ID format"))
            .unwrap_or(DEFAULT_CHAIN_ID);

        let ipfs_gateway = env::var("BASECARD_IPFS_GATEWAY")
            .unwrap_or_else(|_| "https://ipfs.io/ipfs/".to_string());

        let oauth = OAuthConfig {
            github: provider_from_env(
                "GITHUB",
                "https://github.com/login/oauth/access_token",
                "https://api.github.com/user",
            ),
            linkedin: provider_from_env(
                "LINKEDIN",
                "https://www.linkedin.com/oauth/v2/accessToken",
                "https://api.linkedin.com/v2/userinfo",
            ),
            twitter: provider_from_env(
                "TWITTER",
                "https://api.twitter.com/2/oauth2/token",
                "https://api.twitter.com/2/users/me",
            ),
        };

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            log_format,
            rpc_url,
            contract_address,
            chain_id,
            ipfs_gateway,
            oauth,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn provider_from_env(prefix: &str, token_url: &str, profile_url: &str) -> OAuthProviderConfig {
    OAuthProviderConfig {
        client_id: non_empty_var(&format!("BASECARD_{prefix}_CLIENT_ID")),
        client_secret: non_empty_var(&format!("BASECARD_{prefix}_CLIENT_SECRET")),
        token_url: env::var(format!("BASECARD_{prefix}_TOKEN_URL"))
            .unwrap_or_else(|_| token_url.to_string()),
        profile_url: env::var(format!("BASECARD_{prefix}_PROFILE_URL"))
            .unwrap_or_else(|_| profile_url.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        for name in [
            "BASECARD_API_PSK",
            "BASECARD_DB_PATH",
            "BASECARD_BIND_ADDR",
            "BASECARD_LOG_LEVEL",
            "BASECARD_LOG_FORMAT",
            "BASECARD_CONTRACT_ADDRESS",
            "BASECARD_CHAIN_ID",
            "BASECARD_GITHUB_CLIENT_ID",
            "BASECARD_GITHUB_TOKEN_URL",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert!(config.contract_address.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/basecard.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert!(config.oauth.github.client_id.is_none());
        assert_eq!(
            config.oauth.github.token_url,
            "https://github.com/login/oauth/access_token"
        );
    }
}
