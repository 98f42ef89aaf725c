//! OAuth proxy endpoints.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::oauth::{Provider, ProviderResponse, TokenRequest};
use crate::AppState;

fn provider_from_path(segment: &str) -> Result<Provider, AppError> {
    Provider::parse(segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown OAuth provider {}", segment)))
}

fn forward(response: ProviderResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(response.body)).into_response()
}

/// POST /api/auth/{provider}/token - Exchange an authorization code.
pub async fn exchange_token(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(request): Json<TokenRequest>,
) -> Result<Response, AppError> {
    let provider = provider_from_path(&provider)?;
    let response = state.oauth.exchange_code(provider, &request).await?;
    Ok(forward(response))
}

/// GET /api/auth/{provider}/me - Fetch the provider profile for a bearer token.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let provider = provider_from_path(&provider)?;

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let response = state.oauth.fetch_profile(provider, token).await?;
    Ok(forward(response))
}
