// Public API - what other modules can use
pub use handlers::list_players;
pub use service::{rank_players, RankedPlayer, RankingService};

// Internal modules
mod handlers;
mod service;
