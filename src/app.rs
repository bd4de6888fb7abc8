use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::shared::AppState;
use crate::{challenge, player, ranking, session};

/// Builds the HTTP router with every ladder route behind the session middleware
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(session::index))
        .route("/setup", get(session::setup))
        .route("/login", post(session::login))
        .route("/logout", get(session::logout).post(session::logout))
        .route("/players", get(ranking::list_players))
        .route("/player", post(player::create_player))
        .route(
            "/player/:id",
            get(player::get_player).post(player::update_player),
        )
        .route("/player/:id/update", post(player::update_player))
        .route("/player/:id/delete", post(player::delete_player))
        .route("/challenges", get(challenge::list_challenges))
        .route("/challenge", post(challenge::create_challenge))
        .route("/challenge/:id", get(challenge::get_challenge))
        .route("/challenge/:id/update", post(challenge::score_challenge))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
