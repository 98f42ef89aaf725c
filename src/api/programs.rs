//! Program API endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateProgramRequest, Program, ProgramType};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramQuery {
    pub owner_card_id: Option<i64>,
}

/// GET /api/programs - List programs, optionally for one owner.
pub async fn list_programs(
    State(state): State<AppState>,
    Query(params): Query<ProgramQuery>,
) -> ApiResult<Vec<Program>> {
    success(state.repo.list_programs(params.owner_card_id).await?)
}

/// POST /api/programs - Publish a bounty or project.
pub async fn create_program(
    State(state): State<AppState>,
    Json(request): Json<CreateProgramRequest>,
) -> ApiResult<Program> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    let owner_card_id = request
        .owner_card_id
        .ok_or_else(|| AppError::Validation("ownerCardId is required".to_string()))?;
    let program_type = request
        .program_type
        .as_deref()
        .and_then(ProgramType::parse)
        .ok_or_else(|| AppError::Validation("type must be bounty or project".to_string()))?;

    success(
        state
            .repo
            .create_program(&request.title, &request.description, owner_card_id, program_type)
            .await?,
    )
}
