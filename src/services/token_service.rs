use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::errors::ApiError;
use crate::types::db::user;
use crate::types::internal::auth::Claims;
use crate::types::internal::permissions::Role;

/// Manages JWT generation and validation
pub struct TokenService {
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl TokenService {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            jwt_expiration_hours: 8,
        }
    }

    /// Generate a JWT carrying the user's identity and role at issue time.
    pub fn generate_jwt(&self, user: &user::Model) -> Result<String, ApiError> {
        let role = Role::parse(&user.role).ok_or_else(|| {
            tracing::error!(user_id = user.id, role = %user.role, "Unknown role on user row");
            ApiError::internal_server_error()
        })?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role,
            exp: now + self.jwt_expiration_hours * 3600,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("Failed to generate JWT: {}", e);
            ApiError::internal_server_error()
        })
    }

    /// Validate a JWT and return the claims.
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::expired_token(),
            _ => ApiError::invalid_token(),
        })?;

        Ok(token_data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(id: i32, username: &str, role: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role: role.to_string(),
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret-key-minimum-32-characters-long".to_string())
    }

    #[test]
    fn generated_jwt_round_trips_claims() {
        let token_service = service();
        let user = test_user(7, "alice", "ADMIN");

        let token = token_service.generate_jwt(&user).unwrap();
        let claims = token_service.validate_jwt(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[test]
    fn validation_fails_with_wrong_secret() {
        let token_service = service();
        let other = TokenService::new("another-secret-key-minimum-32-characters".to_string());

        let token = token_service.generate_jwt(&test_user(1, "bob", "USER")).unwrap();
        let result = other.validate_jwt(&token);

        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[test]
    fn validation_rejects_expired_jwt() {
        let token_service = service();
        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: 1,
            username: "bob".to_string(),
            role: Role::User,
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret("test-secret-key-minimum-32-characters-long".as_bytes()),
        )
        .unwrap();

        let result = token_service.validate_jwt(&token);
        assert_eq!(result.unwrap_err().message(), "JWT has expired");
    }

    #[test]
    fn generation_rejects_unknown_role() {
        let token_service = service();
        let result = token_service.generate_jwt(&test_user(1, "bob", "SUPERVISOR"));
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let token_service = service();
        let debug_output = format!("{:?}", token_service);
        assert!(!debug_output.contains("test-secret-key"));
        assert!(debug_output.contains("<redacted>"));
    }
}
