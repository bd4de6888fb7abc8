use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::{normalize_email, PlayerModel},
    repository::PlayerRepository,
    types::{CreatePlayerRequest, PlayerResponse, UpdatePlayerRequest},
};
use crate::challenge::repository::ChallengeRepository;
use crate::shared::AppError;

pub const ADMIN_NAME: &str = "Admin";
pub const ADMIN_EMAIL: &str = "admin@example.org";

/// Service for player records.
/// Win counts are derived from completed challenges whenever a player is read.
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository + Send + Sync>,
    challenge_repository: Arc<dyn ChallengeRepository + Send + Sync>,
}

impl PlayerService {
    pub fn new(
        repository: Arc<dyn PlayerRepository + Send + Sync>,
        challenge_repository: Arc<dyn ChallengeRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            challenge_repository,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_player(
        &self,
        request: CreatePlayerRequest,
    ) -> Result<PlayerResponse, AppError> {
        let player = PlayerModel::new(request.name, &request.email);
        player.validate()?;

        self.repository.create_player(&player).await?;

        info!(player_id = %player.id, email = %player.email, "Player registered");
        Ok(PlayerResponse::from_model(player, 0))
    }

    #[instrument(skip(self))]
    pub async fn get_player(&self, player_id: &str) -> Result<PlayerResponse, AppError> {
        let player = self.require_player(player_id).await?;
        let total_wins = self.challenge_repository.count_wins(player_id).await?;
        Ok(PlayerResponse::from_model(player, total_wins))
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<PlayerModel>, AppError> {
        self.repository
            .get_player_by_email(&normalize_email(email))
            .await
    }

    /// Applies the supplied fields. Nothing is stored unless the
    /// resulting record is valid.
    #[instrument(skip(self))]
    pub async fn update_player(
        &self,
        player_id: &str,
        request: UpdatePlayerRequest,
    ) -> Result<PlayerResponse, AppError> {
        let existing = self.require_player(player_id).await?;

        let updated = existing.with_changes(request.name.as_deref(), request.email.as_deref());
        updated.validate()?;

        self.repository.update_player(&updated).await?;
        info!(player_id = %player_id, "Player updated");

        let total_wins = self.challenge_repository.count_wins(player_id).await?;
        Ok(PlayerResponse::from_model(updated, total_wins))
    }

    /// Deletes a player that takes part in no challenges.
    /// Players with challenge history are kept so results stay intact; the
    /// repository refuses the delete with `Conflict` under the same write.
    #[instrument(skip(self))]
    pub async fn delete_player(&self, player_id: &str) -> Result<(), AppError> {
        self.repository.delete_player(player_id).await?;
        info!(player_id = %player_id, "Player deleted");
        Ok(())
    }

    /// Creates the initial Admin player, but only on an empty ladder
    #[instrument(skip(self))]
    pub async fn bootstrap_admin(&self) -> Result<Option<PlayerResponse>, AppError> {
        if self.repository.count_players().await? > 0 {
            debug!("Players already exist, skipping admin bootstrap");
            return Ok(None);
        }

        let admin = self
            .create_player(CreatePlayerRequest {
                name: ADMIN_NAME.to_string(),
                email: ADMIN_EMAIL.to_string(),
            })
            .await?;
        info!(player_id = %admin.id, "Bootstrapped admin player");
        Ok(Some(admin))
    }

    async fn require_player(&self, player_id: &str) -> Result<PlayerModel, AppError> {
        self.repository
            .get_player(player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Player {player_id}")))
    }
}
