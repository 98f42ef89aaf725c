//! BaseCard Backend
//!
//! REST backend for the BaseCard Mini App: card registry on SQLite, on-chain
//! card reads, OAuth bridge for social verification and the quest reward loop.

mod api;
mod auth;
mod chain;
mod config;
mod db;
mod errors;
mod models;
mod oauth;
mod quests;
mod retry;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chain::{CardContract, DisabledContract, EthersCardContract};
use config::{Config, LogFormat};
use db::Repository;
use oauth::OAuthClient;
use retry::RetryPolicy;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub contract: Arc<dyn CardContract>,
    pub oauth: OAuthClient,
    pub chain_retry: RetryPolicy,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting BaseCard Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (BASECARD_API_PSK). Card writes are open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Connect to the card contract
    let contract: Arc<dyn CardContract> = match config.contract_address.as_deref() {
        Some(address) => {
            let contract = EthersCardContract::connect(&config.rpc_url, address)?;
            chain::await_chain_id(
                &contract,
                config.chain_id,
                chain::CHAIN_POLL_ATTEMPTS,
                chain::CHAIN_POLL_INTERVAL,
            )
            .await?;
            tracing::info!("Card contract {} on chain {}", address, config.chain_id);
            Arc::new(contract)
        }
        None => {
            tracing::warn!(
                "No card contract configured (BASECARD_CONTRACT_ADDRESS). Chain reads are disabled!"
            );
            Arc::new(DisabledContract)
        }
    };

    let oauth = OAuthClient::new(config.oauth.clone())?;

    // Create application state
    let state = AppState {
        repo,
        contract,
        oauth,
        chain_retry: RetryPolicy::default(),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // Card registry routes, writes guarded by the PSK
    let registry_routes = Router::new()
        .route(
            "/card/{address}",
            get(api::get_card)
                .put(api::update_card)
                .delete(api::delete_card),
        )
        .route("/cards", get(api::list_cards).post(api::create_card))
        .route(
            "/collections",
            get(api::list_collections).post(api::create_collection),
        )
        .route("/programs", get(api::list_programs).post(api::create_program))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_write_guard(psk.clone(), req, next)
        }));

    let public_routes = Router::new()
        // Chain
        .route("/onchain/{address}", get(api::get_onchain_card))
        // Quests
        .route("/quests", get(api::list_quests))
        .route("/quests/claim", post(api::claim_quest))
        .route("/quests/points/{address}", get(api::get_points))
        // OAuth bridge
        .route("/auth/{provider}/token", post(api::exchange_token))
        .route("/auth/{provider}/me", get(api::get_profile));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", registry_routes.merge(public_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
