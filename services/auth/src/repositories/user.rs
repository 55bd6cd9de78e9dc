//! User repository for database operations

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use common::error::DatabaseError;
use sqlx::SqlitePool;
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{NewUser, Role, User},
};

/// Handle of the bootstrap administrator
pub const ADMIN_USERNAME: &str = "admin";

/// Password given to the bootstrap administrator.
///
/// Publicly known; only a convenience for first start.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin1234";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new user and return its id
    ///
    /// A duplicate handle or email surfaces as [`AuthError::Conflict`].
    pub async fn create(&self, new_user: &NewUser) -> AuthResult<i64> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, email, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(new_user.role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from_query(e) {
            DatabaseError::UniqueViolation(_) => AuthError::Conflict,
            other => AuthError::Database(other),
        })?;

        Ok(id)
    }

    /// Check a handle/password pair and return the matching user
    ///
    /// Unknown handles are verified against a dummy hash so both failure
    /// paths take the same time and return the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<User> {
        let user = self.find_by_username(username).await?;

        let stored_hash = match &user {
            Some(user) => user.password_hash.as_str(),
            None => dummy_hash()?,
        };
        let password_ok = verify_password(password, stored_hash)?;

        match user {
            Some(user) if password_ok => Ok(user),
            Some(_) => {
                info!("Login failed: wrong password for {}", username);
                Err(AuthError::InvalidCredentials)
            }
            None => {
                info!("Login failed: unknown user {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, email, phone, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(user)
    }

    /// Replace a user's password, returning false when the user does not exist
    pub async fn reset_password(&self, username: &str, password: &str) -> AuthResult<bool> {
        let password_hash = hash_password(password)?;

        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
            .bind(&password_hash)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Create the bootstrap administrator if no `admin` user exists.
    ///
    /// Returns true when the account was created.
    pub async fn ensure_default_admin(&self) -> AuthResult<bool> {
        if self.find_by_username(ADMIN_USERNAME).await?.is_some() {
            return Ok(false);
        }

        let admin = default_admin(DEFAULT_ADMIN_PASSWORD);
        match self.create(&admin).await {
            Ok(_) => {
                warn!(
                    "Default admin user created: {} / {} (change this password)",
                    ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD
                );
                Ok(true)
            }
            // Another process created it first
            Err(AuthError::Conflict) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Set the admin password, creating the admin account when missing
    pub async fn reset_admin(&self, password: &str) -> AuthResult<()> {
        if self.reset_password(ADMIN_USERNAME, password).await? {
            info!("Admin password reset");
        } else {
            info!("Admin user not found, creating it");
            self.create(&default_admin(password)).await?;
        }
        Ok(())
    }
}

fn default_admin(password: &str) -> NewUser {
    NewUser {
        username: ADMIN_USERNAME.to_string(),
        password: password.to_string(),
        email: "admin@example.com".to_string(),
        phone: "0000000000".to_string(),
        role: Role::Admin,
    }
}

fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Crypto(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn dummy_hash() -> AuthResult<&'static str> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash.as_str());
    }
    let hash = hash_password("timing-parity-placeholder")?;
    Ok(DUMMY_HASH.get_or_init(|| hash).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool, migrate};

    async fn repository() -> UserRepository {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        migrate(&pool).await.unwrap();
        UserRepository::new(pool)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "pw".into(),
            email: email.into(),
            phone: "555".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let repo = repository().await;
        let id = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let user = repo.authenticate("alice", "pw").await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "pw");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_handle_or_email_is_a_conflict() {
        let repo = repository().await;
        repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let err = repo.create(&new_user("alice", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));

        let err = repo.create(&new_user("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let repo = repository().await;
        repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let wrong = repo.authenticate("alice", "nope").await.unwrap_err();
        let unknown = repo.authenticate("mallory", "pw").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn default_admin_is_created_once() {
        let repo = repository().await;
        assert!(repo.ensure_default_admin().await.unwrap());
        assert!(!repo.ensure_default_admin().await.unwrap());

        let admin = repo
            .authenticate(ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn reset_admin_creates_or_updates() {
        let repo = repository().await;
        repo.reset_admin("first").await.unwrap();
        assert!(repo.authenticate(ADMIN_USERNAME, "first").await.is_ok());

        repo.reset_admin("second").await.unwrap();
        assert!(repo.authenticate(ADMIN_USERNAME, "first").await.is_err());
        assert!(repo.authenticate(ADMIN_USERNAME, "second").await.is_ok());
    }
}
