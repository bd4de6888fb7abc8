use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{AsRefStr, Display, EnumIter};
use uuid::Uuid;

use crate::shared::AppError;

/// Lifecycle of a challenge. `Completed` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    Pending,
    Completed,
}

/// Database model for challenges table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ChallengeModel {
    pub id: String,
    pub from_player_id: String,
    pub to_player_id: String,
    pub from_player_score: Option<i32>,
    pub to_player_score: Option<i32>,
    pub completed: bool,
    pub winner_id: Option<String>, // Set exactly when completed
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChallengeModel {
    /// Creates a pending challenge with no scores and no winner
    pub fn new(from_player_id: impl Into<String>, to_player_id: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            from_player_id: from_player_id.into(),
            to_player_id: to_player_id.into(),
            from_player_score: None,
            to_player_score: None,
            completed: false,
            winner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> ChallengeStatus {
        if self.completed {
            ChallengeStatus::Completed
        } else {
            ChallengeStatus::Pending
        }
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.from_player_id == player_id || self.to_player_id == player_id
    }

    /// Returns the completed version of this challenge for the given scores.
    ///
    /// The strictly higher score wins. Ties and negative scores are rejected,
    /// as is scoring a challenge that is already completed. `self` is never
    /// modified, so a rejected result leaves nothing half-applied.
    pub fn scored(&self, from_score: i32, to_score: i32) -> Result<ChallengeModel, AppError> {
        if self.completed {
            return Err(AppError::AlreadyCompleted(self.id.clone()));
        }
        if from_score < 0 || to_score < 0 {
            return Err(AppError::Validation(format!(
                "Scores must not be negative (got {from_score}-{to_score})"
            )));
        }

        let winner_id = match from_score.cmp(&to_score) {
            std::cmp::Ordering::Greater => self.from_player_id.clone(),
            std::cmp::Ordering::Less => self.to_player_id.clone(),
            std::cmp::Ordering::Equal => {
                return Err(AppError::Validation(format!(
                    "A challenge cannot end in a tie ({from_score}-{to_score})"
                )))
            }
        };

        Ok(ChallengeModel {
            from_player_score: Some(from_score),
            to_player_score: Some(to_score),
            completed: true,
            winner_id: Some(winner_id),
            updated_at: Utc::now(),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[test]
    fn test_new_challenge_is_pending() {
        let challenge = ChallengeModel::new("alice", "bob");

        assert_eq!(challenge.status(), ChallengeStatus::Pending);
        assert!(!challenge.completed);
        assert!(challenge.winner_id.is_none());
        assert!(challenge.from_player_score.is_none());
        assert!(challenge.to_player_score.is_none());
        assert!(challenge.involves("alice"));
        assert!(challenge.involves("bob"));
        assert!(!challenge.involves("carol"));
    }

    #[rstest]
    #[case(21, 15, "alice")]
    #[case(15, 21, "bob")]
    #[case(1, 0, "alice")]
    #[case(0, 11, "bob")]
    fn test_higher_score_wins(#[case] from: i32, #[case] to: i32, #[case] winner: &str) {
        let challenge = ChallengeModel::new("alice", "bob");

        let completed = challenge.scored(from, to).unwrap();

        assert!(completed.completed);
        assert_eq!(completed.status(), ChallengeStatus::Completed);
        assert_eq!(completed.winner_id.as_deref(), Some(winner));
        assert_eq!(completed.from_player_score, Some(from));
        assert_eq!(completed.to_player_score, Some(to));
        assert_eq!(completed.id, challenge.id);
        assert!(completed.involves(completed.winner_id.as_deref().unwrap()));
    }

    #[rstest]
    #[case(15, 15)]
    #[case(0, 0)]
    #[case(-1, 11)]
    #[case(11, -3)]
    fn test_invalid_scores_are_rejected(#[case] from: i32, #[case] to: i32) {
        let challenge = ChallengeModel::new("alice", "bob");

        let result = challenge.scored(from, to);

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!challenge.completed);
    }

    #[test]
    fn test_completed_challenge_cannot_be_rescored() {
        let completed = ChallengeModel::new("alice", "bob").scored(21, 15).unwrap();

        let result = completed.scored(10, 21);

        assert!(matches!(result, Err(AppError::AlreadyCompleted(_))));
        assert_eq!(completed.winner_id.as_deref(), Some("alice"));
        assert_eq!(completed.from_player_score, Some(21));
    }

    #[test]
    fn test_status_serialization() {
        let names: Vec<String> = ChallengeStatus::iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["PENDING", "COMPLETED"]);

        let json = serde_json::to_string(&ChallengeStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}
