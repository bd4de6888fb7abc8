use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::{RankedPlayer, RankingService};
use crate::shared::{AppError, AppState};

/// HTTP handler for the ladder standings
///
/// GET /players
/// Returns every player ordered by total wins
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedPlayer>>, AppError> {
    let service = RankingService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.challenge_repository),
    );
    let standings = service.rank_players().await?;

    info!(player_count = standings.len(), "Standings computed");

    Ok(Json(standings))
}
