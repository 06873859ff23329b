//! Authentication service - registration, login and account credentials.
//!
//! Passwords go through the domain [`Password`] value object. Registration
//! writes the profile and the credentials in one transaction.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{CacheDomain, Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Auth, NewAuth, NewUser, Password, ProfileResponse, Role};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Hash checked when the email is unknown, so both login failures cost
/// one argon2 verification.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("dummy-password-for-unknown-accounts")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Sign-up input, validated by the handler
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: Option<String>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a user and its credentials
    async fn register(&self, registration: Registration) -> AppResult<ProfileResponse>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Profile joined with the account of `user_id`
    async fn profile(&self, user_id: i32) -> AppResult<ProfileResponse>;

    async fn change_password(
        &self,
        user_id: i32,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Set the role of an account (admin only, checked by the route)
    async fn change_role(&self, user_id: i32, role: Role) -> AppResult<ProfileResponse>;
}

fn generate_token(auth: &Auth, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: auth.user_id,
        email: auth.email.clone(),
        role: auth.role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )
    .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::TokenInvalid,
    })?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<ProfileResponse> {
        let email = registration.email.trim().to_lowercase();
        if self.uow.auths().exists_by_email(&email).await? {
            return Err(AppError::AlreadyExists(Resource::Auth));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let new_user = NewUser {
            firstname: registration.firstname,
            lastname: registration.lastname,
            phone: registration.phone,
        };

        let (user, auth) = with_transaction!(self.uow, |ctx| {
            let user = ctx.users().create(new_user).await?;
            let auth = ctx
                .auths()
                .create(NewAuth {
                    user_id: user.id,
                    email,
                    password_hash,
                    role: Role::User,
                })
                .await?;
            Ok((user, auth))
        })?;

        self.uow
            .cache()
            .invalidate_domains(&[CacheDomain::User, CacheDomain::Auth])
            .await;

        tracing::info!(user_id = user.id, "User registered");

        Ok(ProfileResponse {
            user: user.into(),
            email: auth.email,
            role: auth.role,
        })
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = email.trim().to_lowercase();
        let account = self.uow.auths().find_by_email(&email).await?;

        // Verify even when the account is unknown so timing does not leak
        // which emails exist.
        let stored = match &account {
            Some(auth) => Password::from_hash(auth.password_hash.as_str()),
            None => Password::from_hash(DUMMY_HASH.as_str()),
        };
        let password_valid = stored.verify(&password);

        match account {
            Some(auth) if password_valid => generate_token(&auth, &self.config),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn profile(&self, user_id: i32) -> AppResult<ProfileResponse> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_not_found(Resource::User)?;
        let account = self
            .uow
            .auths()
            .find_account(user_id)
            .await?
            .ok_or_not_found(Resource::Auth)?;

        Ok(ProfileResponse {
            user: user.into(),
            email: account.email,
            role: account.role,
        })
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let auth = self
            .uow
            .auths()
            .find_by_user_id(user_id)
            .await?
            .ok_or_not_found(Resource::Auth)?;

        if !Password::from_hash(auth.password_hash).verify(&current_password) {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = Password::new(&new_password)?.into_string();
        self.uow
            .auths()
            .update_password(user_id, password_hash)
            .await?
            .ok_or_not_found(Resource::Auth)?;

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    async fn change_role(&self, user_id: i32, role: Role) -> AppResult<ProfileResponse> {
        self.uow
            .auths()
            .update_role(user_id, role)
            .await?
            .ok_or_not_found(Resource::Auth)?;

        tracing::info!(user_id, role = %role, "Role changed");
        self.profile(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::entities::{auth, user};
    use crate::services::testing::{self, MockRepos};
    use mockall::predicate::eq;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn config() -> Config {
        Config::new(
            "postgres://localhost/test",
            "a-test-secret-that-is-long-enough-123",
        )
        .unwrap()
    }

    fn hashed(password: &str) -> String {
        Password::new(password).unwrap().into_string()
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let mut repos = MockRepos::new();
        repos
            .auths
            .expect_exists_by_email()
            .with(eq("taken@example.com"))
            .returning(|_| Ok(true));

        let service = Authenticator::new(repos.into_uow(), config());
        let result = service
            .register(Registration {
                email: "Taken@Example.com".to_string(),
                password: "password123".to_string(),
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::AlreadyExists(Resource::Auth))));
    }

    #[tokio::test]
    async fn test_register_creates_user_and_credentials() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user::Model {
                id: 7,
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                phone: None,
                created_at: now,
                updated_at: now,
                anonymized_at: None,
            }]])
            .append_query_results([vec![auth::Model {
                id: 3,
                user_id: 7,
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
                role: "USER".to_string(),
                created_at: now,
                updated_at: now,
            }]])
            .into_connection();

        let mut repos = MockRepos::new();
        repos.auths.expect_exists_by_email().returning(|_| Ok(false));

        let service = Authenticator::new(repos.into_uow_with_db(db), config());
        let profile = service
            .register(Registration {
                email: "ada@example.com".to_string(),
                password: "password123".to_string(),
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                phone: None,
            })
            .await
            .unwrap();

        assert_eq!(profile.user.id, 7);
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let mut repos = MockRepos::new();
        repos.auths.expect_exists_by_email().returning(|_| Ok(false));

        let service = Authenticator::new(repos.into_uow(), config());
        let result = service
            .register(Registration {
                email: "ada@example.com".to_string(),
                password: "short".to_string(),
                firstname: "Ada".to_string(),
                lastname: "Lovelace".to_string(),
                phone: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_login_and_verify_token() {
        let hash = hashed("password123");
        let mut repos = MockRepos::new();
        repos
            .auths
            .expect_find_by_email()
            .returning(move |_| Ok(Some(testing::auth(5, Role::Driver, &hash))));

        let service = Authenticator::new(repos.into_uow(), config());
        let token = service
            .login("user5@example.com".to_string(), "password123".to_string())
            .await
            .unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 24 * 3600);

        let claims = service.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, 5);
        assert_eq!(claims.role, Role::Driver);
        assert_eq!(claims.email, "user5@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let hash = hashed("password123");
        let mut repos = MockRepos::new();
        repos
            .auths
            .expect_find_by_email()
            .returning(move |_| Ok(Some(testing::auth(5, Role::User, &hash))));

        let service = Authenticator::new(repos.into_uow(), config());
        let result = service
            .login("user5@example.com".to_string(), "not-the-password".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repos = MockRepos::new();
        repos.auths.expect_find_by_email().returning(|_| Ok(None));

        let service = Authenticator::new(repos.into_uow(), config());
        let result = service
            .login("nobody@example.com".to_string(), "password123".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_expired_token() {
        let config = config();
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: 1,
            email: "a@example.com".to_string(),
            role: Role::User,
            exp: past.timestamp(),
            iat: (past - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_token_internal(&token, &config),
            Err(AppError::TokenExpired)
        ));
        assert!(matches!(
            verify_token_internal("not-a-jwt", &config),
            Err(AppError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn test_change_password_checks_current() {
        let hash = hashed("password123");
        let mut repos = MockRepos::new();
        repos
            .auths
            .expect_find_by_user_id()
            .returning(move |_| Ok(Some(testing::auth(5, Role::User, &hash))));
        repos.auths.expect_update_password().never();

        let service = Authenticator::new(repos.into_uow(), config());
        let result = service
            .change_password(5, "wrong-password".to_string(), "new-password-1".to_string())
            .await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_profile_uses_hash_free_account() {
        let mut repos = MockRepos::new();
        repos
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::user(id))));
        repos
            .auths
            .expect_find_account()
            .returning(|id| Ok(Some(testing::auth(id, Role::Driver, "hash").into())));
        repos.auths.expect_find_by_user_id().never();

        let service = Authenticator::new(repos.into_uow(), config());
        let profile = service.profile(5).await.unwrap();

        assert_eq!(profile.user.id, 5);
        assert_eq!(profile.role, Role::Driver);
    }

    #[tokio::test]
    async fn test_change_role_unknown_account() {
        let mut repos = MockRepos::new();
        repos.auths.expect_update_role().returning(|_, _| Ok(None));

        let service = Authenticator::new(repos.into_uow(), config());
        let result = service.change_role(99, Role::Admin).await;

        assert!(matches!(result, Err(AppError::NotFound(Resource::Auth))));
    }
}
