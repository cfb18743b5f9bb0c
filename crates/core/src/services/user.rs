//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use votings_common::{config::AuthConfig, AppError, AppResult, IdGenerator};
use votings_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
    auth_config: AuthConfig,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_password_confirmation"))]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Must repeat `password` when present.
    #[serde(default)]
    pub password_confirmation: Option<String>,
}

fn validate_password_confirmation(
    input: &CreateUserInput,
) -> Result<(), validator::ValidationError> {
    match &input.password_confirmation {
        Some(confirmation) if *confirmation != input.password => Err(
            validator::ValidationError::new("password_mismatch")
                .with_message("The two password fields didn't match".into()),
        ),
        _ => Ok(()),
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, auth_config: AuthConfig) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
            auth_config,
        }
    }

    /// Create a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let is_staff = self.auth_config.is_staff_username(&input.username);

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            is_staff: Set(is_staff),
            created_at: Set(chrono::Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, is_staff, "User signed up");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Replace the user's token, invalidating the old one. Used for sign-out.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            password_hash: hash_password(password).unwrap(),
            token: Some("test_token".to_string()),
            is_staff: false,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(db: MockDatabase, staff: &[&str]) -> UserService {
        let user_repo = UserRepository::new(Arc::new(db.into_connection()));
        let auth_config = AuthConfig {
            staff_usernames: staff.iter().map(ToString::to_string).collect(),
        };
        UserService::new(user_repo, auth_config)
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_password_confirmation_mismatch() {
        let input = CreateUserInput {
            username: "alice".to_string(),
            password: "correct horse".to_string(),
            password_confirmation: Some("battery staple".to_string()),
        };
        assert!(input.validate().is_err());

        let input = CreateUserInput {
            password_confirmation: Some("correct horse".to_string()),
            ..input
        };
        assert!(input.validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let existing = create_test_user("user1", "alice", "password123");
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
            &[],
        );

        let result = service
            .create(CreateUserInput {
                username: "Alice".to_string(),
                password: "password123".to_string(),
                password_confirmation: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_grants_staff_from_config() {
        let mut created = create_test_user("user1", "moderator", "password123");
        created.is_staff = true;

        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
            &["moderator"],
        );

        let user = service
            .create(CreateUserInput {
                username: "moderator".to_string(),
                password: "password123".to_string(),
                password_confirmation: Some("password123".to_string()),
            })
            .await
            .unwrap();

        assert!(user.is_staff);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let user = create_test_user("user1", "alice", "password123");
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user]]),
            &[],
        );

        assert_eq!(
            service.authenticate("alice", "password123").await.unwrap().id,
            "user1"
        );
        assert!(matches!(
            service.authenticate("alice", "nope-nope").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_not_found() {
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            &[],
        );

        let result = service.authenticate_by_token("invalid").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
