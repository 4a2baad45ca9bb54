use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AdminDto, LoginRequestDto, LoginResponseDto};
use crate::features::auth::model::{AdminUser, AuthenticatedAdmin, SessionClaims};

/// Deliberately identical for unknown accounts and wrong passwords, so the
/// response does not reveal whether an account exists.
const GENERIC_UNAUTHORIZED: &str = "Invalid email or password";

/// Service for admin sign-in and session token validation
pub struct AuthService {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Sign in with email/password and issue a session token.
    ///
    /// Only accounts present in admin_users can sign in; anyone else gets
    /// the generic unauthorized message.
    pub async fn sign_in(&self, dto: LoginRequestDto) -> Result<LoginResponseDto> {
        let admin = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM admin_users
            WHERE email = $1
            "#,
        )
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up admin account: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::Unauthorized(GENERIC_UNAUTHORIZED.to_string()))?;

        if !verify_password(&dto.password, &admin.password_hash)? {
            return Err(AppError::Unauthorized(GENERIC_UNAUTHORIZED.to_string()));
        }

        let (access_token, expires_in) = self.issue_token(&admin)?;

        tracing::info!("Admin signed in: id={}", admin.id);

        Ok(LoginResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            admin: AdminDto {
                id: admin.id,
                email: admin.email,
            },
        })
    }

    /// Validate a bearer token and confirm the account is still an admin.
    pub async fn authenticate_token(&self, token: &str) -> Result<AuthenticatedAdmin> {
        let claims = self.decode_token(token)?;

        let admin_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid session token".to_string()))?;

        // Re-check the admin_users row: a deleted admin keeps a valid token
        // until expiry but must lose access immediately.
        let is_admin = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM admin_users WHERE id = $1)"#,
        )
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check admin privilege: {:?}", e);
            AppError::Database(e)
        })?;

        if !is_admin {
            return Err(AppError::Unauthorized(GENERIC_UNAUTHORIZED.to_string()));
        }

        Ok(AuthenticatedAdmin {
            admin_id,
            email: claims.email,
        })
    }

    fn issue_token(&self, admin: &AdminUser) -> Result<(String, i64)> {
        let now = Utc::now().timestamp();
        let ttl = self.config.token_ttl.as_secs() as i64;

        let claims = SessionClaims {
            sub: admin.id.to_string(),
            email: admin.email.clone(),
            iat: now,
            exp: now + ttl,
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to issue session token: {}", e)))?;

        Ok((token, ttl))
    }

    fn decode_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.jwt_leeway.as_secs();

        jsonwebtoken::decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid or expired session token".to_string()))
    }
}

/// Hash a password for storage in admin_users
#[allow(dead_code)]
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            token_ttl: Duration::from_secs(3600),
            jwt_leeway: Duration::from_secs(60),
        }
    }

    fn test_service() -> AuthService {
        AuthService::new(crate::core::database::lazy_test_pool(), test_config())
    }

    fn test_admin() -> AdminUser {
        AdminUser {
            id: Uuid::new_v4(),
            email: "admin@tubocom.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn session_token_roundtrip() {
        let service = test_service();
        let admin = test_admin();

        let (token, expires_in) = service.issue_token(&admin).unwrap();
        assert_eq!(expires_in, 3600);

        let claims = service.decode_token(&token).unwrap();
        assert_eq!(claims.sub, admin.id.to_string());
        assert_eq!(claims.email, admin.email);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let (token, _) = service.issue_token(&test_admin()).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(service.decode_token(&tampered).is_err());
        assert!(service.decode_token("not-a-token").is_err());
    }
}
