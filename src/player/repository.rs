use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::PlayerModel;
use crate::db::map_write_error;
use crate::memory::{LadderTables, SharedTables};
use crate::shared::AppError;

/// Trait for player repository operations
#[async_trait]
pub trait PlayerRepository {
    /// Fails with `Validation` when another player already uses the email
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError>;
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError>;
    async fn get_player_by_email(&self, email: &str) -> Result<Option<PlayerModel>, AppError>;
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError>;
    /// Replaces the stored record; fails with `NotFound` if it does not exist
    async fn update_player(&self, player: &PlayerModel) -> Result<(), AppError>;
    /// Fails with `Conflict` while the player takes part in any challenge
    async fn delete_player(&self, player_id: &str) -> Result<(), AppError>;
    async fn count_players(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of PlayerRepository for development and testing
pub struct InMemoryPlayerRepository {
    tables: SharedTables,
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlayerRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            tables: SharedTables::default(),
        }
    }

    /// Creates an in-memory repository with pre-populated players
    pub fn with_players(players: Vec<PlayerModel>) -> Self {
        let players = players
            .into_iter()
            .map(|player| (player.id.clone(), player))
            .collect();

        Self {
            tables: Arc::new(RwLock::new(LadderTables {
                players,
                ..LadderTables::default()
            })),
        }
    }

    /// Tables to hand to an `InMemoryChallengeRepository` over the same players
    pub fn tables(&self) -> SharedTables {
        Arc::clone(&self.tables)
    }
}

fn email_taken(players: &HashMap<String, PlayerModel>, email: &str, except_id: &str) -> bool {
    players
        .values()
        .any(|p| p.email == email && p.id != except_id)
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        debug!(player_id = %player.id, email = %player.email, "Creating player in memory");

        let mut tables = self.tables.write().await;
        if tables.players.contains_key(&player.id) {
            warn!(player_id = %player.id, "Player already exists in memory");
            return Err(AppError::DatabaseError("Player already exists".to_string()));
        }
        if email_taken(&tables.players, &player.email, &player.id) {
            warn!(email = %player.email, "Email already registered in memory");
            return Err(AppError::Validation(format!(
                "Email {} is already registered",
                player.email
            )));
        }
        tables.players.insert(player.id.clone(), player.clone());

        debug!(player_id = %player.id, "Player created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError> {
        let tables = self.tables.read().await;
        let player = tables.players.get(player_id).cloned();

        match &player {
            Some(p) => debug!(player_id = %player_id, name = %p.name, "Player found in memory"),
            None => debug!(player_id = %player_id, "Player not found in memory"),
        }

        Ok(player)
    }

    #[instrument(skip(self))]
    async fn get_player_by_email(&self, email: &str) -> Result<Option<PlayerModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.players.values().find(|p| p.email == email).cloned())
    }

    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.players.values().cloned().collect())
    }

    #[instrument(skip(self, player))]
    async fn update_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        debug!(player_id = %player.id, "Updating player in memory");

        let mut tables = self.tables.write().await;
        if !tables.players.contains_key(&player.id) {
            warn!(player_id = %player.id, "Player not found for update in memory");
            return Err(AppError::NotFound(format!("Player {}", player.id)));
        }
        if email_taken(&tables.players, &player.email, &player.id) {
            warn!(email = %player.email, "Email already registered to another player");
            return Err(AppError::Validation(format!(
                "Email {} is already registered",
                player.email
            )));
        }
        tables.players.insert(player.id.clone(), player.clone());

        debug!(player_id = %player.id, "Player updated successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, player_id: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.players.contains_key(player_id) {
            warn!(player_id = %player_id, "Player not found for deletion in memory");
            return Err(AppError::NotFound(format!("Player {player_id}")));
        }

        let challenge_count = tables.challenges_for_player(player_id);
        if challenge_count > 0 {
            warn!(
                player_id = %player_id,
                challenge_count = challenge_count,
                "Refusing to delete player with challenges"
            );
            return Err(AppError::Conflict(format!(
                "Player {player_id} takes part in {challenge_count} challenge(s) and cannot be deleted"
            )));
        }
        tables.players.remove(player_id);

        debug!(player_id = %player_id, "Player deleted from memory");
        Ok(())
    }

    async fn count_players(&self) -> Result<u64, AppError> {
        Ok(self.tables.read().await.players.len() as u64)
    }
}

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        debug!(player_id = %player.id, email = %player.email, "Creating player in database");

        sqlx::query(
            "INSERT INTO players (id, name, email, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&player.id)
        .bind(&player.name)
        .bind(&player.email)
        .bind(player.created_at)
        .bind(player.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Player email"))?;

        debug!(player_id = %player.id, "Player created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player(&self, player_id: &str) -> Result<Option<PlayerModel>, AppError> {
        let player = sqlx::query_as::<_, PlayerModel>(
            "SELECT id, name, email, created_at, updated_at FROM players WHERE id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    #[instrument(skip(self))]
    async fn get_player_by_email(&self, email: &str) -> Result<Option<PlayerModel>, AppError> {
        let player = sqlx::query_as::<_, PlayerModel>(
            "SELECT id, name, email, created_at, updated_at FROM players WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        let players = sqlx::query_as::<_, PlayerModel>(
            "SELECT id, name, email, created_at, updated_at FROM players",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    #[instrument(skip(self, player))]
    async fn update_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE players SET name = $2, email = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(&player.id)
        .bind(&player.name)
        .bind(&player.email)
        .bind(player.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Player email"))?;

        if result.rows_affected() == 0 {
            warn!(player_id = %player.id, "Player not found for update");
            return Err(AppError::NotFound(format!("Player {}", player.id)));
        }

        debug!(player_id = %player.id, "Player updated successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, player_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Player"))?;

        if result.rows_affected() == 0 {
            warn!(player_id = %player_id, "Player not found for deletion");
            return Err(AppError::NotFound(format!("Player {player_id}")));
        }

        Ok(())
    }

    async fn count_players(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
