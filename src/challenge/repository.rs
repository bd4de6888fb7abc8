use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

use super::models::ChallengeModel;
use crate::db::map_write_error;
use crate::memory::SharedTables;
use crate::player::repository::InMemoryPlayerRepository;
use crate::shared::AppError;

/// Result of attempting to store a challenge result
#[derive(Debug, Clone)]
pub enum CompleteChallengeResult {
    /// The result was stored, returns the completed challenge
    Success(ChallengeModel),
    /// Another result was stored first, returns the record as it stands
    AlreadyCompleted(ChallengeModel),
    /// Challenge does not exist
    ChallengeNotFound,
}

/// Trait for challenge repository operations
#[async_trait]
pub trait ChallengeRepository {
    /// Fails with `Validation` unless both participants exist
    async fn create_challenge(&self, challenge: &ChallengeModel) -> Result<(), AppError>;
    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<ChallengeModel>, AppError>;
    /// All challenges, newest first
    async fn list_challenges(&self) -> Result<Vec<ChallengeModel>, AppError>;

    /// Atomically stores scores, winner and the completed flag, but only while the
    /// stored record is still pending. Two racing results cannot both succeed.
    async fn complete_challenge(
        &self,
        completed: &ChallengeModel,
    ) -> Result<CompleteChallengeResult, AppError>;

    /// Number of completed challenges won, keyed by player id.
    /// Players without wins are absent.
    async fn win_counts(&self) -> Result<HashMap<String, u32>, AppError>;
    async fn count_wins(&self, player_id: &str) -> Result<u32, AppError>;
}

/// In-memory implementation of ChallengeRepository for development and testing.
/// Shares its tables with the player repository it was created for.
pub struct InMemoryChallengeRepository {
    tables: SharedTables,
}

impl InMemoryChallengeRepository {
    /// Creates a repository over the same tables as `players`
    pub fn for_players(players: &InMemoryPlayerRepository) -> Self {
        Self {
            tables: players.tables(),
        }
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryChallengeRepository {
    #[instrument(skip(self, challenge))]
    async fn create_challenge(&self, challenge: &ChallengeModel) -> Result<(), AppError> {
        debug!(
            challenge_id = %challenge.id,
            from_player_id = %challenge.from_player_id,
            to_player_id = %challenge.to_player_id,
            "Creating challenge in memory"
        );

        let mut tables = self.tables.write().await;
        if tables.challenges.contains_key(&challenge.id) {
            warn!(challenge_id = %challenge.id, "Challenge already exists in memory");
            return Err(AppError::DatabaseError(
                "Challenge already exists".to_string(),
            ));
        }
        for player_id in [&challenge.from_player_id, &challenge.to_player_id] {
            if !tables.players.contains_key(player_id) {
                warn!(player_id = %player_id, "Challenge refers to an unknown player");
                return Err(AppError::Validation(format!("Player {player_id} does not exist")));
            }
        }
        tables
            .challenges
            .insert(challenge.id.clone(), challenge.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<ChallengeModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.challenges.get(challenge_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_challenges(&self) -> Result<Vec<ChallengeModel>, AppError> {
        let tables = self.tables.read().await;
        let mut list: Vec<ChallengeModel> = tables.challenges.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    #[instrument(skip(self, completed))]
    async fn complete_challenge(
        &self,
        completed: &ChallengeModel,
    ) -> Result<CompleteChallengeResult, AppError> {
        debug!(challenge_id = %completed.id, "Attempting to complete challenge atomically");

        let mut tables = self.tables.write().await;

        let stored = match tables.challenges.get_mut(&completed.id) {
            Some(stored) => stored,
            None => {
                debug!(challenge_id = %completed.id, "Challenge not found");
                return Ok(CompleteChallengeResult::ChallengeNotFound);
            }
        };

        if stored.completed {
            debug!(challenge_id = %completed.id, "Challenge already completed");
            return Ok(CompleteChallengeResult::AlreadyCompleted(stored.clone()));
        }

        stored.from_player_score = completed.from_player_score;
        stored.to_player_score = completed.to_player_score;
        stored.winner_id = completed.winner_id.clone();
        stored.completed = true;
        stored.updated_at = completed.updated_at;

        info!(
            challenge_id = %stored.id,
            winner_id = ?stored.winner_id,
            "Challenge completed in memory"
        );
        Ok(CompleteChallengeResult::Success(stored.clone()))
    }

    async fn win_counts(&self) -> Result<HashMap<String, u32>, AppError> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for winner_id in tables
            .challenges
            .values()
            .filter(|c| c.completed)
            .filter_map(|c| c.winner_id.as_ref())
        {
            *counts.entry(winner_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_wins(&self, player_id: &str) -> Result<u32, AppError> {
        let tables = self.tables.read().await;
        let wins = tables
            .challenges
            .values()
            .filter(|c| c.completed && c.winner_id.as_deref() == Some(player_id))
            .count();
        Ok(wins as u32)
    }
}

/// PostgreSQL implementation of challenge repository
pub struct PostgresChallengeRepository {
    pool: PgPool,
}

impl PostgresChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CHALLENGE_COLUMNS: &str = "id, from_player_id, to_player_id, from_player_score, \
     to_player_score, completed, winner_id, created_at, updated_at";

#[async_trait]
impl ChallengeRepository for PostgresChallengeRepository {
    #[instrument(skip(self, challenge))]
    async fn create_challenge(&self, challenge: &ChallengeModel) -> Result<(), AppError> {
        debug!(challenge_id = %challenge.id, "Creating challenge in database");

        sqlx::query(
            "INSERT INTO challenges (id, from_player_id, to_player_id, from_player_score, \
             to_player_score, completed, winner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&challenge.id)
        .bind(&challenge.from_player_id)
        .bind(&challenge.to_player_id)
        .bind(challenge.from_player_score)
        .bind(challenge.to_player_score)
        .bind(challenge.completed)
        .bind(&challenge.winner_id)
        .bind(challenge.created_at)
        .bind(challenge.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let unknown_player = e
                .as_database_error()
                .is_some_and(|db_error| db_error.is_foreign_key_violation());
            if unknown_player {
                warn!(challenge_id = %challenge.id, "Challenge refers to an unknown player");
                return AppError::Validation("Both players must exist".to_string());
            }
            map_write_error(e, "Challenge")
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<ChallengeModel>, AppError> {
        let challenge = sqlx::query_as::<_, ChallengeModel>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = $1"
        ))
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(challenge)
    }

    #[instrument(skip(self))]
    async fn list_challenges(&self) -> Result<Vec<ChallengeModel>, AppError> {
        let challenges = sqlx::query_as::<_, ChallengeModel>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(challenges)
    }

    #[instrument(skip(self, completed))]
    async fn complete_challenge(
        &self,
        completed: &ChallengeModel,
    ) -> Result<CompleteChallengeResult, AppError> {
        let updated = sqlx::query_as::<_, ChallengeModel>(&format!(
            "UPDATE challenges SET from_player_score = $2, to_player_score = $3, \
             winner_id = $4, completed = TRUE, updated_at = $5 \
             WHERE id = $1 AND completed = FALSE RETURNING {CHALLENGE_COLUMNS}"
        ))
        .bind(&completed.id)
        .bind(completed.from_player_score)
        .bind(completed.to_player_score)
        .bind(&completed.winner_id)
        .bind(completed.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Challenge result"))?;

        if let Some(challenge) = updated {
            info!(challenge_id = %challenge.id, "Challenge completed in database");
            return Ok(CompleteChallengeResult::Success(challenge));
        }

        // Nothing matched: either the challenge is gone or it was already scored
        match self.get_challenge(&completed.id).await? {
            Some(existing) => Ok(CompleteChallengeResult::AlreadyCompleted(existing)),
            None => Ok(CompleteChallengeResult::ChallengeNotFound),
        }
    }

    async fn win_counts(&self) -> Result<HashMap<String, u32>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT winner_id, COUNT(*) FROM challenges \
             WHERE completed AND winner_id IS NOT NULL GROUP BY winner_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(player_id, wins)| (player_id, wins as u32))
            .collect())
    }

    async fn count_wins(&self, player_id: &str) -> Result<u32, AppError> {
        let wins: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM challenges WHERE completed AND winner_id = $1",
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(wins as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{models::PlayerModel, repository::PlayerRepository};
    use std::sync::Arc;

    fn player(id: &str) -> PlayerModel {
        let mut player = PlayerModel::new(id, &format!("{id}@example.org"));
        player.id = id.to_string();
        player
    }

    fn ladder(ids: &[&str]) -> (Arc<InMemoryPlayerRepository>, Arc<InMemoryChallengeRepository>) {
        let players = Arc::new(InMemoryPlayerRepository::with_players(
            ids.iter().map(|id| player(id)).collect(),
        ));
        let challenges = Arc::new(InMemoryChallengeRepository::for_players(&players));
        (players, challenges)
    }

    #[tokio::test]
    async fn test_complete_challenge_only_once() {
        let (_, repo) = ladder(&["alice", "bob"]);
        let challenge = ChallengeModel::new("alice", "bob");
        repo.create_challenge(&challenge).await.unwrap();

        let first = challenge.scored(21, 15).unwrap();
        let result = repo.complete_challenge(&first).await.unwrap();
        assert!(matches!(result, CompleteChallengeResult::Success(_)));

        // A second result computed from the stale pending copy must not win
        let second = challenge.scored(3, 21).unwrap();
        match repo.complete_challenge(&second).await.unwrap() {
            CompleteChallengeResult::AlreadyCompleted(existing) => {
                assert_eq!(existing.from_player_score, Some(21));
                assert_eq!(existing.to_player_score, Some(15));
                assert_eq!(existing.winner_id.as_deref(), Some("alice"));
            }
            other => panic!("expected AlreadyCompleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_missing_challenge() {
        let (_, repo) = ladder(&["alice", "bob"]);
        let completed = ChallengeModel::new("alice", "bob").scored(21, 15).unwrap();

        let result = repo.complete_challenge(&completed).await.unwrap();
        assert!(matches!(result, CompleteChallengeResult::ChallengeNotFound));
    }

    #[tokio::test]
    async fn test_win_counts_only_include_completed() {
        let (_, repo) = ladder(&["alice", "bob", "carol"]);

        let pending = ChallengeModel::new("alice", "bob");
        repo.create_challenge(&pending).await.unwrap();

        for (from, to) in [(21, 10), (21, 19), (5, 21)] {
            let challenge = ChallengeModel::new("alice", "carol");
            repo.create_challenge(&challenge).await.unwrap();
            repo.complete_challenge(&challenge.scored(from, to).unwrap())
                .await
                .unwrap();
        }

        let counts = repo.win_counts().await.unwrap();
        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.get("carol"), Some(&1));
        assert_eq!(counts.get("bob"), None);

        assert_eq!(repo.count_wins("alice").await.unwrap(), 2);
        assert_eq!(repo.count_wins("bob").await.unwrap(), 0);
        assert_eq!(repo.list_challenges().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_list_challenges_newest_first() {
        let (_, repo) = ladder(&["alice", "bob"]);
        let older = ChallengeModel::new("alice", "bob");
        let mut newer = ChallengeModel::new("bob", "alice");
        newer.created_at = older.created_at + chrono::Duration::seconds(5);

        repo.create_challenge(&older).await.unwrap();
        repo.create_challenge(&newer).await.unwrap();

        let list = repo.list_challenges().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, newer.id);
        assert_eq!(list[1].id, older.id);
    }

    #[tokio::test]
    async fn test_create_challenge_requires_both_players() {
        let (_, repo) = ladder(&["alice"]);

        let result = repo
            .create_challenge(&ChallengeModel::new("alice", "nobody"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(repo.list_challenges().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_player_with_challenges_is_refused() {
        let (players, repo) = ladder(&["alice", "bob", "carol"]);
        repo.create_challenge(&ChallengeModel::new("alice", "bob"))
            .await
            .unwrap();

        let result = players.delete_player("bob").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(players.get_player("bob").await.unwrap().is_some());

        players.delete_player("carol").await.unwrap();
        assert!(players.get_player("carol").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_challenge_for_player_deleted_after_lookup_is_rejected() {
        let (players, repo) = ladder(&["alice", "bob"]);
        // The caller saw both players, then bob was removed before the insert
        let challenge = ChallengeModel::new("alice", "bob");
        players.delete_player("bob").await.unwrap();

        let result = repo.create_challenge(&challenge).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(repo.list_challenges().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_create_and_delete_leave_no_dangling_challenge() {
        for _ in 0..50 {
            let (players, repo) = ladder(&["alice", "bob"]);

            let create = {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.create_challenge(&ChallengeModel::new("alice", "bob"))
                        .await
                })
            };
            let delete = {
                let players = Arc::clone(&players);
                tokio::spawn(async move { players.delete_player("bob").await })
            };

            let created = create.await.unwrap().is_ok();
            let deleted = delete.await.unwrap().is_ok();

            // Exactly one side wins, and a stored challenge always has its players
            assert!(created != deleted);
            let bob_exists = players.get_player("bob").await.unwrap().is_some();
            for challenge in repo.list_challenges().await.unwrap() {
                assert!(challenge.involves("bob"));
                assert!(bob_exists);
            }
        }
    }
}
