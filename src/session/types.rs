use serde::{Deserialize, Serialize};

use crate::player::models::PlayerModel;

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub player_id: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Request payload for logging in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Response structure for a successful login
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub token: String, // The JWT token
    pub player_id: String,
    pub name: String,
}

/// The logged-in player for the current request.
/// Inserted into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentPlayer {
    pub player: PlayerModel,
    pub session_id: String,
}
