//! User management: CRUD with cache invalidation, bootstrap of the first
//! super admin, and GDPR-style anonymization.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::models::blacklist::BlacklistEntry;
use crate::models::user::User;
use crate::security::keys::{generate_token, sha256_hex};
use crate::security::password::hash_password;
use crate::security::roles::UserRole;
use crate::storage::repository::{BlacklistRepository, TokenRepository, UserRepository};

const LIST_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// New user payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub username: Option<String>,
    pub password: String,
    pub role: Option<String>,
    pub active: Option<bool>,
}

/// Partial user update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
    pub settings: Option<serde_json::Value>,
}

/// User operations
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self) -> Result<Vec<User>>;
    async fn find(&self, id: &str) -> Result<User>;
    async fn create(&self, input: CreateUserInput) -> Result<User>;
    async fn update(&self, id: &str, input: UpdateUserInput) -> Result<User>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// True while no super admin exists yet
    async fn setup_required(&self) -> Result<bool>;
    async fn create_super_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User>;
    /// Scramble PII, retire the account and blacklist its identity hashes
    async fn anonymize(&self, id: &str) -> Result<()>;
}

pub struct UserServiceImpl {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    blacklist: Arc<dyn BlacklistRepository>,
    cache: Arc<dyn CacheStore>,
}

impl UserServiceImpl {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        blacklist: Arc<dyn BlacklistRepository>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            users,
            tokens,
            blacklist,
            cache,
        }
    }

    async fn invalidate(&self, id: Option<&str>) {
        let mut keys = vec!["users".to_string()];
        if let Some(id) = id {
            keys.push(format!("user:{}", id));
        }
        if let Err(e) = self.cache.delete_many(&keys).await {
            warn!(error = %e, "failed to invalidate user cache");
        }
    }

    fn validate_role(role: &str) -> Result<()> {
        UserRole::parse(role)
            .map(|_| ())
            .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", role)))
    }

    async fn ensure_identity_available(&self, email: &str, username: Option<&str>) -> Result<()> {
        let email_hash = sha256_hex(email);
        let username_hash = sha256_hex(username.unwrap_or(email));

        if self.blacklist.contains(&email_hash, &username_hash).await? {
            return Err(AppError::business(
                409,
                "IDENTITY_BLACKLISTED",
                "This identity can no longer be used",
            ));
        }

        if self.users.get_by_email(email).await?.is_some() {
            return Err(AppError::business(
                409,
                "EMAIL_ALREADY_EXISTS",
                "Email is already in use",
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list(&self) -> Result<Vec<User>> {
        if let Some(cached) = self.cache.get("users").await? {
            if let Ok(users) = serde_json::from_str::<Vec<User>>(&cached) {
                return Ok(users);
            }
        }

        let users = self.users.list().await?;
        if let Ok(serialized) = serde_json::to_string(&users) {
            if let Err(e) = self
                .cache
                .set("users", &serialized, Some(LIST_CACHE_TTL))
                .await
            {
                warn!(error = %e, "failed to cache user list");
            }
        }
        Ok(users)
    }

    async fn find(&self, id: &str) -> Result<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::business(404, "USER_NOT_FOUND", "User not found"))
    }

    async fn create(&self, input: CreateUserInput) -> Result<User> {
        let email = input.email.trim().to_lowercase();
        self.ensure_identity_available(&email, input.username.as_deref())
            .await?;

        if let Some(role) = &input.role {
            Self::validate_role(role)?;
        }

        let mut user = User::new(&input.name, &email, &hash_password(&input.password)?);
        user.last_name = input.last_name;
        user.username = input.username.map(|u| u.trim().to_lowercase());
        if let Some(role) = input.role {
            user.role = Some(role);
        }
        if let Some(active) = input.active {
            user.is_active = active;
        }

        let created = self.users.create(&user).await?;
        self.invalidate(None).await;
        Ok(created)
    }

    async fn update(&self, id: &str, input: UpdateUserInput) -> Result<User> {
        let mut user = self.find(id).await?;

        if let Some(role) = &input.role {
            Self::validate_role(role)?;
            user.role = Some(role.clone());
        }
        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(email) = input.email {
            let email = email.trim().to_lowercase();
            if email != user.email {
                if self.users.get_by_email(&email).await?.is_some() {
                    return Err(AppError::business(
                        409,
                        "EMAIL_ALREADY_EXISTS",
                        "Email is already in use",
                    ));
                }
                user.email = email;
                user.email_verified_at = None;
            }
        }
        if let Some(username) = input.username {
            user.username = Some(username.trim().to_lowercase());
        }
        if let Some(password) = input.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(active) = input.active {
            user.is_active = active;
        }
        if let Some(settings) = input.settings {
            user.settings = Some(settings);
        }

        user.touch();
        let updated = self
            .users
            .update(id, &user)
            .await?
            .ok_or_else(|| AppError::business(404, "USER_NOT_FOUND", "User not found"))?;

        self.invalidate(Some(id)).await;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if !self.users.delete(id).await? {
            return Err(AppError::business(404, "USER_NOT_FOUND", "User not found"));
        }
        self.tokens.delete_for_user(id).await?;
        self.invalidate(Some(id)).await;
        Ok(())
    }

    async fn setup_required(&self) -> Result<bool> {
        Ok(self.users.count_by_role(UserRole::Super.as_str()).await? == 0)
    }

    async fn create_super_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<User> {
        if !self.setup_required().await? {
            return Err(AppError::business(
                409,
                "SUPER_ADMIN_EXISTS",
                "A super admin already exists",
            ));
        }

        if password != password_confirmation {
            return Err(AppError::business(
                400,
                "PASSWORD_MISMATCH",
                "Password confirmation does not match",
            ));
        }

        let email = email.trim().to_lowercase();
        let mut user = User::new(name, &email, &hash_password(password)?);
        user.role = Some(UserRole::Super.as_str().to_string());
        user.email_verified_at = Some(Utc::now());

        let created = self.users.create(&user).await?;
        self.invalidate(None).await;
        info!(user_id = %created.id, "super admin created");
        Ok(created)
    }

    async fn anonymize(&self, id: &str) -> Result<()> {
        let mut user = self.find(id).await?;

        if user.is_deleted {
            return Err(AppError::business(
                400,
                "USER_ALREADY_ANONYMIZED",
                "User is already anonymized",
            ));
        }

        let entry = BlacklistEntry::new(
            &user.id,
            &sha256_hex(&user.email),
            &sha256_hex(user.username.as_deref().unwrap_or(&user.email)),
        );
        self.blacklist.create(&entry).await?;

        user.email = format!("deleted_{}@internal.system", user.id);
        user.name = "User".to_string();
        user.last_name = Some("Deleted".to_string());
        user.username = Some(format!("deleted_user_{}", user.id));
        user.password_hash = hash_password(&generate_token())?;
        user.role = Some(UserRole::Deleted.as_str().to_string());
        user.settings = None;
        user.last_login_at = None;
        user.last_ip = None;
        user.email_verified_at = None;
        user.is_active = false;
        user.is_deleted = true;
        user.touch();

        self.users.update(id, &user).await?;
        self.tokens.delete_for_user(id).await?;
        self.invalidate(Some(id)).await;
        info!(user_id = %id, "user anonymized");
        Ok(())
    }
}

/// Build the default user service
pub fn create_user_service(
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    blacklist: Arc<dyn BlacklistRepository>,
    cache: Arc<dyn CacheStore>,
) -> Arc<dyn UserService> {
    Arc::new(UserServiceImpl::new(users, tokens, blacklist, cache))
}
