use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::ChallengeService,
    types::{ChallengeResponse, CreateChallengeRequest, ScoreChallengeRequest},
};
use crate::shared::{AppError, AppState, JsonBody};

fn challenge_service(state: &AppState) -> ChallengeService {
    ChallengeService::new(
        Arc::clone(&state.challenge_repository),
        Arc::clone(&state.player_repository),
        state.notifications.clone(),
    )
}

/// HTTP handler for issuing a challenge
///
/// POST /challenge
#[instrument(name = "create_challenge", skip(state))]
pub async fn create_challenge(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<ChallengeResponse>), AppError> {
    let challenge = challenge_service(&state).create_challenge(request).await?;

    info!(challenge_id = %challenge.id, "Challenge issued");

    Ok((StatusCode::CREATED, Json(challenge)))
}

/// GET /challenges
#[instrument(name = "list_challenges", skip(state))]
pub async fn list_challenges(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChallengeResponse>>, AppError> {
    let challenges = challenge_service(&state).list_challenges().await?;
    Ok(Json(challenges))
}

/// GET /challenge/:id
#[instrument(name = "get_challenge", skip(state))]
pub async fn get_challenge(
    State(state): State<AppState>,
    Path(challenge_id): Path<String>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let challenge = challenge_service(&state).get_challenge(&challenge_id).await?;
    Ok(Json(challenge))
}

/// HTTP handler for recording a challenge result
///
/// POST /challenge/:id/update
/// Fails with 400 if the challenge already has a result
#[instrument(name = "score_challenge", skip(state))]
pub async fn score_challenge(
    State(state): State<AppState>,
    Path(challenge_id): Path<String>,
    JsonBody(request): JsonBody<ScoreChallengeRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let challenge = challenge_service(&state)
        .set_score_and_complete(&challenge_id, request)
        .await?;

    info!(
        challenge_id = %challenge.id,
        winner_id = ?challenge.winner_id,
        "Challenge result recorded"
    );

    Ok(Json(challenge))
}
