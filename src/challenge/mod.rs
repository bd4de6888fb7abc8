// Public API - what other modules can use
pub use handlers::{create_challenge, get_challenge, list_challenges, score_challenge};
pub use service::ChallengeService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
