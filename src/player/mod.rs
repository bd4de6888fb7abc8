// Public API - what other modules can use
pub use handlers::{create_player, delete_player, get_player, update_player};
pub use service::PlayerService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
