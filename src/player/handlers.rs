use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::PlayerService,
    types::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
};
use crate::shared::{AppError, AppState, JsonBody};

fn player_service(state: &AppState) -> PlayerService {
    PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.challenge_repository),
    )
}

/// HTTP handler for registering a player
///
/// POST /player
#[instrument(name = "create_player", skip(state))]
pub async fn create_player(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    let player = player_service(&state).create_player(request).await?;

    info!(player_id = %player.id, "Player created");

    Ok((StatusCode::CREATED, Json(player)))
}

/// GET /player/:id
#[instrument(name = "get_player", skip(state))]
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerResponse>, AppError> {
    let player = player_service(&state).get_player(&player_id).await?;
    Ok(Json(player))
}

/// POST /player/:id and POST /player/:id/update
#[instrument(name = "update_player", skip(state))]
pub async fn update_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    JsonBody(request): JsonBody<UpdatePlayerRequest>,
) -> Result<Json<PlayerResponse>, AppError> {
    let player = player_service(&state)
        .update_player(&player_id, request)
        .await?;
    Ok(Json(player))
}

/// POST /player/:id/delete
#[instrument(name = "delete_player", skip(state))]
pub async fn delete_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<StatusCode, AppError> {
    player_service(&state).delete_player(&player_id).await?;

    info!(player_id = %player_id, "Player removed");

    Ok(StatusCode::NO_CONTENT)
}
