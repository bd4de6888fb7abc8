use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::SessionService,
    types::{CurrentPlayer, LoginRequest, SessionResponse},
};
use crate::player::{types::PlayerResponse, PlayerService};
use crate::shared::{AppError, AppState, JsonBody};

fn session_service(state: &AppState) -> SessionService {
    SessionService::new(
        Arc::clone(&state.session_repository),
        Arc::clone(&state.player_repository),
        state.token_config.clone(),
    )
}

/// GET /
/// Sends logged-in players to the standings
#[instrument(name = "index", skip_all)]
pub async fn index(current: Option<Extension<CurrentPlayer>>) -> Response {
    match current {
        Some(_) => Redirect::to("/players").into_response(),
        None => Json(json!({ "message": "Please log in", "login": "/login" })).into_response(),
    }
}

/// GET /setup
/// Creates the Admin player on an empty ladder, otherwise does nothing
#[instrument(name = "setup", skip(state))]
pub async fn setup(State(state): State<AppState>) -> Result<Response, AppError> {
    let service = PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.challenge_repository),
    );

    match service.bootstrap_admin().await? {
        Some(admin) => Ok((StatusCode::CREATED, Json::<PlayerResponse>(admin)).into_response()),
        None => Ok(Redirect::to("/").into_response()),
    }
}

/// POST /login
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = session_service(&state).login(request).await?;

    info!(player_id = %session.player_id, "Session created");

    Ok(Json(session))
}

/// GET or POST /logout
/// Revokes the current session and sends the player back to the index
#[instrument(name = "logout", skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPlayer>,
) -> Result<Redirect, AppError> {
    session_service(&state)
        .revoke_session(&current.session_id)
        .await?;

    info!(player_id = %current.player.id, "Player logged out");

    Ok(Redirect::to("/"))
}
