use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::PlayerModel;

/// Request payload for registering a player
#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
    pub email: String,
}

/// Request payload for a partial player update.
/// Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Player as exposed over the API, with the derived win count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub total_wins: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerResponse {
    pub fn from_model(player: PlayerModel, total_wins: u32) -> Self {
        Self {
            id: player.id,
            name: player.name,
            email: player.email,
            total_wins,
            created_at: player.created_at,
            updated_at: player.updated_at,
        }
    }
}
