use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use latter::{
    challenge::types::ChallengeResponse, player::types::PlayerResponse, session::SessionResponse,
};

use super::setup::TestSetup;

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(self.request("GET", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.send(
            self.request("POST", uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Logs in and returns the bearer token
    pub async fn login(&self, email: &str) -> String {
        let response = self.post("/login", json!({ "email": email })).await;
        assert_eq!(response.status(), StatusCode::OK);
        read_json::<SessionResponse>(response).await.token
    }

    pub async fn create_player(&self, name: &str, email: &str) -> PlayerResponse {
        let response = self
            .post("/player", json!({ "name": name, "email": email }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await
    }

    pub async fn create_challenge(&self, from: &str, to: &str) -> Response {
        self.post(
            "/challenge",
            json!({ "from_player_id": from, "to_player_id": to }),
        )
        .await
    }

    pub async fn score(&self, challenge_id: &str, from_score: i32, to_score: i32) -> Response {
        self.post(
            &format!("/challenge/{challenge_id}/update"),
            json!({ "from_player_score": from_score, "to_player_score": to_score }),
        )
        .await
    }

    pub async fn get_challenge(&self, challenge_id: &str) -> ChallengeResponse {
        let response = self.get(&format!("/challenge/{challenge_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        read_json(response).await
    }
}
