use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::SessionClaims;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: Arc<str>,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn with_secret(secret: &str, expiration_days: i64) -> Self {
        Self {
            secret: Arc::from(secret),
            expiration_days,
        }
    }

    /// Creates a new JWT token for a player session
    #[instrument(skip(self, session_id, player_id))]
    pub fn create_token(&self, session_id: String, player_id: String) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = SessionClaims {
            session_id,
            player_id,
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates a JWT token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                player_id = %data.claims.player_id,
                session_id = %data.claims.session_id,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let config = TokenConfig::with_secret("secret", 7);

        let token = config
            .create_token("session-1".to_string(), "player-1".to_string())
            .unwrap();
        assert!(!token.is_empty());

        let claims = config.validate_token(&token).unwrap();
        assert_eq!(claims.session_id, "session-1");
        assert_eq!(claims.player_id, "player-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token() {
        let config = TokenConfig::with_secret("secret", 7);
        let result = config.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::JwtError(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let issuer = TokenConfig::with_secret("one-secret", 7);
        let other = TokenConfig::with_secret("another-secret", 7);

        let token = issuer
            .create_token("session".to_string(), "player".to_string())
            .unwrap();

        assert!(issuer.validate_token(&token).is_ok());
        assert!(matches!(
            other.validate_token(&token),
            Err(AppError::JwtError(_))
        ));
    }
}
