use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::challenge::repository::ChallengeRepository;
use crate::player::{models::PlayerModel, repository::PlayerRepository, types::PlayerResponse};
use crate::shared::AppError;

/// A player's place on the ladder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedPlayer {
    pub position: usize, // 1-based
    #[serde(flatten)]
    pub player: PlayerResponse,
}

/// Orders players by wins, most first.
///
/// Players with equal wins keep ladder seniority: the one registered first
/// ranks higher, with the id as a final tie-break so the order is stable.
pub fn rank_players(
    players: Vec<PlayerModel>,
    win_counts: &HashMap<String, u32>,
) -> Vec<RankedPlayer> {
    let mut standings: Vec<PlayerResponse> = players
        .into_iter()
        .map(|player| {
            let wins = win_counts.get(&player.id).copied().unwrap_or_default();
            PlayerResponse::from_model(player, wins)
        })
        .collect();

    standings.sort_by(|a, b| {
        b.total_wins
            .cmp(&a.total_wins)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    standings
        .into_iter()
        .enumerate()
        .map(|(index, player)| RankedPlayer {
            position: index + 1,
            player,
        })
        .collect()
}

/// Computes the ladder from the stored players and challenge results
pub struct RankingService {
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    challenge_repository: Arc<dyn ChallengeRepository + Send + Sync>,
}

impl RankingService {
    pub fn new(
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        challenge_repository: Arc<dyn ChallengeRepository + Send + Sync>,
    ) -> Self {
        Self {
            player_repository,
            challenge_repository,
        }
    }

    #[instrument(skip(self))]
    pub async fn rank_players(&self) -> Result<Vec<RankedPlayer>, AppError> {
        let players = self.player_repository.list_players().await?;
        let win_counts = self.challenge_repository.win_counts().await?;

        debug!(
            player_count = players.len(),
            winners = win_counts.len(),
            "Computing ladder standings"
        );

        Ok(rank_players(players, &win_counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::models::ChallengeModel;
    use crate::challenge::repository::InMemoryChallengeRepository;
    use crate::player::repository::InMemoryPlayerRepository;
    use chrono::Duration;

    fn player(name: &str, registered_offset_secs: i64) -> PlayerModel {
        let mut player = PlayerModel::new(name, &format!("{}@example.org", name.to_lowercase()));
        player.created_at += Duration::seconds(registered_offset_secs);
        player
    }

    fn names(ranked: &[RankedPlayer]) -> Vec<&str> {
        ranked.iter().map(|r| r.player.name.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_by_wins_descending() {
        let alice = player("Alice", 0);
        let bob = player("Bob", 1);
        let carol = player("Carol", 2);
        let wins = HashMap::from([(bob.id.clone(), 3), (carol.id.clone(), 1)]);

        let ranked = rank_players(vec![alice, bob, carol], &wins);

        assert_eq!(names(&ranked), vec!["Bob", "Carol", "Alice"]);
        assert_eq!(
            ranked.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(ranked[0].player.total_wins, 3);
        assert_eq!(ranked[2].player.total_wins, 0);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].player.total_wins >= w[1].player.total_wins));
    }

    #[test]
    fn test_equal_wins_rank_by_registration() {
        let early = player("Early", 0);
        let late = player("Late", 60);

        let ranked = rank_players(vec![late, early], &HashMap::new());

        assert_eq!(names(&ranked), vec!["Early", "Late"]);
    }

    #[test]
    fn test_rank_empty_ladder() {
        assert!(rank_players(vec![], &HashMap::new()).is_empty());
    }

    #[tokio::test]
    async fn test_ranking_service_uses_completed_challenges() {
        let alice = player("Alice", 0);
        let bob = player("Bob", 1);
        let players = Arc::new(InMemoryPlayerRepository::with_players(vec![
            alice.clone(),
            bob.clone(),
        ]));
        let challenges = Arc::new(InMemoryChallengeRepository::for_players(&players));
        let service = RankingService::new(players, challenges.clone());

        // A pending challenge counts for nobody
        let pending = ChallengeModel::new(alice.id.clone(), bob.id.clone());
        challenges.create_challenge(&pending).await.unwrap();
        let won_by_bob = ChallengeModel::new(alice.id.clone(), bob.id.clone());
        challenges.create_challenge(&won_by_bob).await.unwrap();
        challenges
            .complete_challenge(&won_by_bob.scored(12, 21).unwrap())
            .await
            .unwrap();

        let ranked = service.rank_players().await.unwrap();

        assert_eq!(names(&ranked), vec!["Bob", "Alice"]);
        assert_eq!(ranked[0].player.total_wins, 1);
        assert_eq!(ranked[1].player.total_wins, 0);
    }
}
