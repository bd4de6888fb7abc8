//! Tables behind the in-memory player and challenge repositories.
//!
//! Both repositories lock the same tables, so the player-reference checks on
//! challenge creation and player deletion run under one write lock.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::challenge::models::ChallengeModel;
use crate::player::models::PlayerModel;

#[derive(Debug, Default)]
pub struct LadderTables {
    pub players: HashMap<String, PlayerModel>,
    pub challenges: HashMap<String, ChallengeModel>,
}

impl LadderTables {
    pub fn challenges_for_player(&self, player_id: &str) -> usize {
        self.challenges
            .values()
            .filter(|c| c.involves(player_id))
            .count()
    }
}

pub type SharedTables = Arc<RwLock<LadderTables>>;
