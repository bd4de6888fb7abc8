// Library crate for the Latter ladder server
// This file exposes the public API for the binary and integration tests

pub mod app;
pub mod challenge;
pub mod config;
pub mod db;
pub mod memory;
pub mod notify;
pub mod player;
pub mod ranking;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use app::router;
pub use challenge::{models::ChallengeModel, repository::ChallengeRepository, ChallengeService};
pub use config::AppConfig;
pub use notify::{Mailer, NotificationQueue, OutgoingMail};
pub use player::{models::PlayerModel, repository::PlayerRepository, PlayerService};
pub use ranking::{RankedPlayer, RankingService};
pub use session::{CurrentPlayer, TokenConfig};
pub use shared::{AppError, AppState};
