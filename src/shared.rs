use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::challenge::repository::ChallengeRepository;
use crate::notify::NotificationQueue;
use crate::player::repository::PlayerRepository;
use crate::session::{repository::SessionRepository, TokenConfig};

/// User-facing messages returned in error bodies
pub mod messages {
    pub const RECORD_NOT_FOUND: &str = "Record not found";
    pub const RECORD_NOT_SAVED: &str = "Record could not be saved. Please check data and try again.";
    pub const CHALLENGE_ALREADY_COMPLETED: &str = "Challenge can only be updated once";
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    pub challenge_repository: Arc<dyn ChallengeRepository + Send + Sync>,
    pub session_repository: Arc<dyn SessionRepository + Send + Sync>,
    pub notifications: NotificationQueue,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        challenge_repository: Arc<dyn ChallengeRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        notifications: NotificationQueue,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            player_repository,
            challenge_repository,
            session_repository,
            notifications,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Challenge {0} has already been completed")]
    AlreadyCompleted(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({ "error": messages::RECORD_NOT_FOUND, "detail": msg }),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": messages::RECORD_NOT_SAVED, "detail": msg }),
            ),
            AppError::AlreadyCompleted(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": messages::CHALLENGE_ALREADY_COMPLETED }),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "A database error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// JSON request body. A body that is missing fields or fails to parse is
/// rejected as a validation error instead of axum's plain-text 422.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(rejection = %rejection.body_text(), "Rejected request body");
                Err(AppError::Validation(rejection.body_text()))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::challenge::repository::InMemoryChallengeRepository;
    use crate::notify::{LogMailer, Mailer};
    use crate::player::{models::PlayerModel, repository::InMemoryPlayerRepository};
    use crate::session::repository::InMemorySessionRepository;

    /// Builder for creating AppState with overrides for testing.
    /// Defaults to an empty in-memory ladder and a log-only mailer.
    pub struct AppStateBuilder {
        players: Vec<PlayerModel>,
        mailer: Option<Arc<dyn Mailer>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                players: Vec::new(),
                mailer: None,
            }
        }

        pub fn with_players(mut self, players: Vec<PlayerModel>) -> Self {
            self.players = players;
            self
        }

        pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
            self.mailer = Some(mailer);
            self
        }

        pub fn build(self) -> AppState {
            let mailer = self.mailer.unwrap_or_else(|| Arc::new(LogMailer));
            let (notifications, _worker) = NotificationQueue::start(mailer);

            let players = Arc::new(InMemoryPlayerRepository::with_players(self.players));
            let challenges = Arc::new(InMemoryChallengeRepository::for_players(&players));

            AppState {
                player_repository: players,
                challenge_repository: challenges,
                session_repository: Arc::new(InMemorySessionRepository::new()),
                notifications,
                token_config: TokenConfig::with_secret("test-secret", 7),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
