use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::ChallengeModel,
    repository::{ChallengeRepository, CompleteChallengeResult},
    types::{ChallengeResponse, CreateChallengeRequest, ScoreChallengeRequest},
};
use crate::notify::{ChallengeNotification, NotificationContext, NotificationQueue};
use crate::player::{models::PlayerModel, repository::PlayerRepository};
use crate::shared::AppError;

/// Service for the challenge lifecycle: issue, look up, and score
pub struct ChallengeService {
    repository: Arc<dyn ChallengeRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    notifications: NotificationQueue,
}

impl ChallengeService {
    pub fn new(
        repository: Arc<dyn ChallengeRepository + Send + Sync>,
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            repository,
            player_repository,
            notifications,
        }
    }

    /// Issues a pending challenge from one player to another.
    /// Both players must exist and players cannot challenge themselves.
    #[instrument(skip(self))]
    pub async fn create_challenge(
        &self,
        request: CreateChallengeRequest,
    ) -> Result<ChallengeResponse, AppError> {
        if request.from_player_id == request.to_player_id {
            warn!(player_id = %request.from_player_id, "Rejected self-challenge");
            return Err(AppError::Validation(
                "A player cannot challenge themselves".to_string(),
            ));
        }

        let from_player = self.require_participant(&request.from_player_id).await?;
        let to_player = self.require_participant(&request.to_player_id).await?;

        let challenge = ChallengeModel::new(from_player.id.clone(), to_player.id.clone());
        self.repository.create_challenge(&challenge).await?;

        info!(
            challenge_id = %challenge.id,
            from_player = %from_player.name,
            to_player = %to_player.name,
            "Challenge created"
        );

        self.notifications
            .notify(&ChallengeNotification::NewChallenge(NotificationContext {
                challenge: challenge.clone(),
                from_player,
                to_player,
            }));

        Ok(challenge.into())
    }

    #[instrument(skip(self))]
    pub async fn get_challenge(&self, challenge_id: &str) -> Result<ChallengeResponse, AppError> {
        self.repository
            .get_challenge(challenge_id)
            .await?
            .map(ChallengeResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("Challenge {challenge_id}")))
    }

    #[instrument(skip(self))]
    pub async fn list_challenges(&self) -> Result<Vec<ChallengeResponse>, AppError> {
        let challenges = self.repository.list_challenges().await?;
        debug!(challenge_count = challenges.len(), "Challenges retrieved");
        Ok(challenges.into_iter().map(ChallengeResponse::from).collect())
    }

    /// Records the final score, derives the winner and completes the challenge.
    ///
    /// Succeeds at most once per challenge. Any failure leaves the stored
    /// challenge exactly as it was.
    #[instrument(skip(self))]
    pub async fn set_score_and_complete(
        &self,
        challenge_id: &str,
        request: ScoreChallengeRequest,
    ) -> Result<ChallengeResponse, AppError> {
        let challenge = self
            .repository
            .get_challenge(challenge_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Challenge {challenge_id}")))?;

        let scored = challenge.scored(request.from_player_score, request.to_player_score)?;

        let completed = match self.repository.complete_challenge(&scored).await? {
            CompleteChallengeResult::Success(completed) => completed,
            CompleteChallengeResult::AlreadyCompleted(_) => {
                warn!(challenge_id = %challenge_id, "Challenge was completed concurrently");
                return Err(AppError::AlreadyCompleted(challenge_id.to_string()));
            }
            CompleteChallengeResult::ChallengeNotFound => {
                return Err(AppError::NotFound(format!("Challenge {challenge_id}")));
            }
        };

        info!(
            challenge_id = %completed.id,
            from_player_score = ?completed.from_player_score,
            to_player_score = ?completed.to_player_score,
            winner_id = ?completed.winner_id,
            "Challenge completed"
        );

        self.notify_updated(&completed).await;

        Ok(completed.into())
    }

    /// An unknown participant makes the challenge itself invalid
    async fn require_participant(&self, player_id: &str) -> Result<PlayerModel, AppError> {
        self.player_repository
            .get_player(player_id)
            .await?
            .ok_or_else(|| {
                warn!(player_id = %player_id, "Challenge refers to an unknown player");
                AppError::Validation(format!("Player {player_id} does not exist"))
            })
    }

    /// The result is already stored, so a lookup failure here only costs the mail
    async fn notify_updated(&self, challenge: &ChallengeModel) {
        let participants = (
            self.player_repository
                .get_player(&challenge.from_player_id)
                .await,
            self.player_repository.get_player(&challenge.to_player_id).await,
        );

        match participants {
            (Ok(Some(from_player)), Ok(Some(to_player))) => {
                self.notifications
                    .notify(&ChallengeNotification::ChallengeUpdated(NotificationContext {
                        challenge: challenge.clone(),
                        from_player,
                        to_player,
                    }));
            }
            _ => {
                warn!(
                    challenge_id = %challenge.id,
                    "Could not load challenge participants, skipping notification"
                );
            }
        }
    }
}
