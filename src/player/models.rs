use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::AppError;

/// Database model for players table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PlayerModel {
    pub id: String,    // UUID v4 as string
    pub name: String,
    pub email: String, // Lower-cased, doubles as login key
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerModel {
    /// Creates a new player with generated ID and timestamps.
    /// The email is normalised; call `validate` before persisting.
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into().trim().to_string(),
            email: normalize_email(email),
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the required fields of a player record
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() {
            return Err(AppError::Validation("Player name is required".to_string()));
        }
        if self.email.is_empty() {
            return Err(AppError::Validation("Player email is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation(format!(
                "Player email '{}' is not a valid address",
                self.email
            )));
        }
        Ok(())
    }

    /// Returns a copy with the supplied fields changed and `updated_at` bumped.
    /// The original record is left untouched so a failed update has no effect.
    pub fn with_changes(&self, name: Option<&str>, email: Option<&str>) -> Self {
        let mut updated = self.clone();
        if let Some(name) = name {
            updated.name = name.trim().to_string();
        }
        if let Some(email) = email {
            updated.email = normalize_email(email);
        }
        updated.updated_at = Utc::now();
        updated
    }
}

/// Emails are compared case-insensitively, so they are stored lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
