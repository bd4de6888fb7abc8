use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{ChallengeModel, ChallengeStatus};

/// Request payload for issuing a challenge
#[derive(Debug, Deserialize)]
pub struct CreateChallengeRequest {
    pub from_player_id: String,
    pub to_player_id: String,
}

/// Request payload for recording the result of a challenge
#[derive(Debug, Deserialize)]
pub struct ScoreChallengeRequest {
    pub from_player_score: i32,
    pub to_player_score: i32,
}

/// Challenge as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeResponse {
    pub id: String,
    pub from_player_id: String,
    pub to_player_id: String,
    pub from_player_score: Option<i32>,
    pub to_player_score: Option<i32>,
    pub completed: bool,
    pub status: ChallengeStatus,
    pub winner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChallengeModel> for ChallengeResponse {
    fn from(challenge: ChallengeModel) -> Self {
        Self {
            status: challenge.status(),
            id: challenge.id,
            from_player_id: challenge.from_player_id,
            to_player_id: challenge.to_player_id,
            from_player_score: challenge.from_player_score,
            to_player_score: challenge.to_player_score,
            completed: challenge.completed,
            winner_id: challenge.winner_id,
            created_at: challenge.created_at,
            updated_at: challenge.updated_at,
        }
    }
}
