use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::SessionModel,
    repository::SessionRepository,
    token::TokenConfig,
    types::{CurrentPlayer, LoginRequest, SessionClaims, SessionResponse},
};
use crate::player::{models::normalize_email, repository::PlayerRepository};
use crate::shared::AppError;

/// Service for handling login, session validation and logout
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            player_repository,
            token_config,
        }
    }

    /// Logs a player in by e-mail and issues a session token
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<SessionResponse, AppError> {
        let email = normalize_email(&request.email);

        let player = match self.player_repository.get_player_by_email(&email).await? {
            Some(player) => player,
            None => {
                warn!(email = %email, "Login attempted for unknown e-mail");
                return Err(AppError::Unauthorized("Unknown e-mail address".to_string()));
            }
        };

        let session = SessionModel::new(player.id.clone(), self.token_config.expiration_days);
        self.repository.create_session(&session).await?;

        let token = self
            .token_config
            .create_token(session.id.clone(), player.id.clone())?;

        info!(
            player_id = %player.id,
            session_id = %session.id,
            "Player logged in"
        );

        Ok(SessionResponse {
            token,
            player_id: player.id,
            name: player.name,
        })
    }

    /// Validates a session token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub async fn validate_session(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        let mut session = match self.repository.get_session(&claims.session_id).await? {
            Some(session) => session,
            None => {
                warn!(
                    session_id = %claims.session_id,
                    "Session not found in database - may have been revoked"
                );
                return Err(AppError::Unauthorized(
                    "Session not found or has been revoked".to_string(),
                ));
            }
        };

        if session.is_expired() {
            warn!(session_id = %claims.session_id, "Session has expired");
            return Err(AppError::Unauthorized("Session has expired".to_string()));
        }

        session.touch();
        self.repository.update_session(&session).await?;

        Ok(claims)
    }

    /// Resolves the player behind a session token
    #[instrument(skip(self, token))]
    pub async fn current_player(&self, token: &str) -> Result<CurrentPlayer, AppError> {
        let claims = self.validate_session(token).await?;

        let player = self
            .player_repository
            .get_player(&claims.player_id)
            .await?
            .ok_or_else(|| {
                warn!(player_id = %claims.player_id, "Session refers to a missing player");
                AppError::Unauthorized("Player no longer exists".to_string())
            })?;

        Ok(CurrentPlayer {
            player,
            session_id: claims.session_id,
        })
    }

    /// Revokes a session by removing it from the database
    #[instrument(skip(self))]
    pub async fn revoke_session(&self, session_id: &str) -> Result<(), AppError> {
        self.repository.delete_session(session_id).await?;
        info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Cleans up expired sessions from the database
    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let removed_count = self.repository.cleanup_expired_sessions().await?;

        info!(
            removed_sessions = removed_count,
            "Expired sessions cleanup completed"
        );
        Ok(removed_count)
    }
}
