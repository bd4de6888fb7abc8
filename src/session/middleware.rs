use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::service::SessionService;
use crate::shared::AppState;

/// Whether a path is only reachable by a logged-in player.
/// The index, the login endpoint and the setup pages are open.
pub fn requires_auth(path: &str) -> bool {
    !(path == "/" || path == "/login" || path.starts_with("/setup"))
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Session middleware - resolves the Authorization Bearer token into a CurrentPlayer.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::authenticate))
/// Handlers can then extract Extension(current): Extension<CurrentPlayer>.
/// Requests to protected paths without a valid session are redirected to `/`.
#[instrument(skip(state, req, next), fields(path = %req.uri().path()))]
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let current = match bearer_token(&req) {
        Some(token) => {
            let service = SessionService::new(
                Arc::clone(&state.session_repository),
                Arc::clone(&state.player_repository),
                state.token_config.clone(),
            );
            match service.current_player(token).await {
                Ok(current) => Some(current),
                Err(e) => {
                    warn!("Session token rejected: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    match current {
        Some(current) => {
            debug!(player_id = %current.player.id, "Request authenticated");
            req.extensions_mut().insert(current);
        }
        None if requires_auth(req.uri().path()) => {
            debug!("No session for protected path, redirecting to index");
            return Redirect::to("/").into_response();
        }
        None => {}
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", false)]
    #[case("/login", false)]
    #[case("/setup", false)]
    #[case("/setup/admin", false)]
    #[case("/logout", true)]
    #[case("/players", true)]
    #[case("/player/abc", true)]
    #[case("/challenge", true)]
    #[case("/login/extra", true)]
    fn test_requires_auth(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(requires_auth(path), expected);
    }
}
