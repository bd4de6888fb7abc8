// Public API - what other modules can use
pub use handlers::{index, login, logout, setup};
pub use middleware::{authenticate, requires_auth};
pub use service::SessionService;
pub use token::TokenConfig;
pub use types::{CurrentPlayer, LoginRequest, SessionClaims, SessionResponse};

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
mod service;
mod token;
mod types;
