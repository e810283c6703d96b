use async_trait::async_trait;
use chrono::Utc;
use std::marker::PhantomData;
use surrealdb::{Surreal, engine::any::Any};

use crate::error::{AppError, Result};
use crate::models::access_log::KeyAccessLog;
use crate::models::app_key::AppKey;
use crate::models::blacklist::BlacklistEntry;
use crate::models::group::{Group, GroupAccessRole, UserGroup};
use crate::models::preference::Preference;
use crate::models::token::AccessToken;
use crate::models::user::User;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
    /// Lookup by email or username
    async fn get_by_identifier(&self, identifier: &str) -> Result<Option<User>>;
    async fn update(&self, id: &str, user: &User) -> Result<Option<User>>;
    async fn delete(&self, id: &str) -> Result<bool>;
    /// Non-deleted users, newest first
    async fn list(&self) -> Result<Vec<User>>;
    async fn count_by_role(&self, role: &str) -> Result<u64>;
}

/// API key repository trait
#[async_trait]
pub trait AppKeyRepository: Send + Sync {
    async fn create(&self, key: &AppKey) -> Result<AppKey>;
    async fn get_by_id(&self, id: &str) -> Result<Option<AppKey>>;
    async fn update(&self, id: &str, key: &AppKey) -> Result<Option<AppKey>>;
    async fn delete(&self, id: &str) -> Result<bool>;
    /// All keys, newest first
    async fn list(&self) -> Result<Vec<AppKey>>;
    /// Keys marked active; expiry is checked by the caller
    async fn list_active(&self) -> Result<Vec<AppKey>>;
}

/// Group repository trait
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: &Group) -> Result<Group>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Group>>;
    async fn update(&self, id: &str, group: &Group) -> Result<Option<Group>>;
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn list(&self, active_only: bool) -> Result<Vec<Group>>;
    async fn list_access_roles(&self, group_id: &str) -> Result<Vec<GroupAccessRole>>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<UserGroup>>;
}

/// Preference repository trait
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn create(&self, preference: &Preference) -> Result<Preference>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Preference>>;
    async fn update(&self, id: &str, preference: &Preference) -> Result<Option<Preference>>;
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn list(&self) -> Result<Vec<Preference>>;
}

/// Access token repository trait
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, token: &AccessToken) -> Result<AccessToken>;
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccessToken>>;
    async fn touch(&self, id: &str) -> Result<()>;
    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool>;
    async fn delete_for_user(&self, user_id: &str) -> Result<()>;
}

/// Gate audit log repository trait
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    async fn create(&self, entry: &KeyAccessLog) -> Result<KeyAccessLog>;
    async fn list(&self, limit: usize, start: usize) -> Result<Vec<KeyAccessLog>>;
}

/// Anonymization blacklist repository trait
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    async fn create(&self, entry: &BlacklistEntry) -> Result<BlacklistEntry>;
    /// Whether either hash is already blacklisted
    async fn contains(&self, email_hash: &str, username_hash: &str) -> Result<bool>;
}

fn count_from(result: Vec<serde_json::Value>) -> u64 {
    result
        .first()
        .and_then(|v| v.get("count"))
        .and_then(|c| c.as_u64())
        .unwrap_or(0)
}

/// SurrealDB user repository
#[derive(Clone)]
pub struct SurrealUserRepository {
    db: Surreal<Any>,
    _marker: PhantomData<User>,
}

impl SurrealUserRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl UserRepository for SurrealUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let created: Option<User> = self
            .db
            .create(("user", user.id.clone()))
            .content(user.clone())
            .await?;

        created.ok_or_else(|| AppError::Database(format!("Failed to create user: {}", user.id)))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let result: Option<User> = self.db.select(("user", id.to_string())).await?;
        Ok(result)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result: Vec<User> = self
            .db
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(result.into_iter().next())
    }

    async fn get_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let result: Vec<User> = self
            .db
            .query("SELECT * FROM user WHERE email = $ident OR username = $ident LIMIT 1")
            .bind(("ident", identifier.to_string()))
            .await?
            .take(0)?;
        Ok(result.into_iter().next())
    }

    async fn update(&self, id: &str, user: &User) -> Result<Option<User>> {
        let updated: Option<User> = self
            .db
            .update(("user", id.to_string()))
            .content(user.clone())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result: Option<User> = self.db.delete(("user", id.to_string())).await?;
        Ok(result.is_some())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let result: Vec<User> = self
            .db
            .query("SELECT * FROM user WHERE is_deleted = false ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(result)
    }

    async fn count_by_role(&self, role: &str) -> Result<u64> {
        let result: Vec<serde_json::Value> = self
            .db
            .query("SELECT count() FROM user WHERE role = $role AND is_deleted = false GROUP ALL")
            .bind(("role", role.to_string()))
            .await?
            .take(0)?;
        Ok(count_from(result))
    }
}

/// SurrealDB API key repository
#[derive(Clone)]
pub struct SurrealAppKeyRepository {
    db: Surreal<Any>,
    _marker: PhantomData<AppKey>,
}

impl SurrealAppKeyRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl AppKeyRepository for SurrealAppKeyRepository {
    async fn create(&self, key: &AppKey) -> Result<AppKey> {
        let created: Option<AppKey> = self
            .db
            .create(("app_key", key.id.clone()))
            .content(key.clone())
            .await?;

        created.ok_or_else(|| AppError::Database(format!("Failed to create app key: {}", key.id)))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AppKey>> {
        let result: Option<AppKey> = self.db.select(("app_key", id.to_string())).await?;
        Ok(result)
    }

    async fn update(&self, id: &str, key: &AppKey) -> Result<Option<AppKey>> {
        let updated: Option<AppKey> = self
            .db
            .update(("app_key", id.to_string()))
            .content(key.clone())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result: Option<AppKey> = self.db.delete(("app_key", id.to_string())).await?;
        Ok(result.is_some())
    }

    async fn list(&self) -> Result<Vec<AppKey>> {
        let result: Vec<AppKey> = self
            .db
            .query("SELECT * FROM app_key ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(result)
    }

    async fn list_active(&self) -> Result<Vec<AppKey>> {
        let result: Vec<AppKey> = self
            .db
            .query("SELECT * FROM app_key WHERE active = true")
            .await?
            .take(0)?;
        Ok(result)
    }
}

/// SurrealDB group repository
#[derive(Clone)]
pub struct SurrealGroupRepository {
    db: Surreal<Any>,
    _marker: PhantomData<Group>,
}

impl SurrealGroupRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl GroupRepository for SurrealGroupRepository {
    async fn create(&self, group: &Group) -> Result<Group> {
        let created: Option<Group> = self
            .db
            .create(("group", group.id.clone()))
            .content(group.clone())
            .await?;

        created.ok_or_else(|| AppError::Database(format!("Failed to create group: {}", group.id)))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Group>> {
        let result: Option<Group> = self.db.select(("group", id.to_string())).await?;
        Ok(result)
    }

    async fn update(&self, id: &str, group: &Group) -> Result<Option<Group>> {
        let updated: Option<Group> = self
            .db
            .update(("group", id.to_string()))
            .content(group.clone())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result: Option<Group> = self.db.delete(("group", id.to_string())).await?;
        Ok(result.is_some())
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Group>> {
        let query = if active_only {
            "SELECT * FROM group WHERE active = true ORDER BY name ASC"
        } else {
            "SELECT * FROM group ORDER BY name ASC"
        };
        let result: Vec<Group> = self.db.query(query).await?.take(0)?;
        Ok(result)
    }

    async fn list_access_roles(&self, group_id: &str) -> Result<Vec<GroupAccessRole>> {
        let result: Vec<GroupAccessRole> = self
            .db
            .query("SELECT * FROM group_access_role WHERE group_id = $group_id")
            .bind(("group_id", group_id.to_string()))
            .await?
            .take(0)?;
        Ok(result)
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<UserGroup>> {
        let result: Vec<UserGroup> = self
            .db
            .query("SELECT * FROM user_group WHERE group_id = $group_id")
            .bind(("group_id", group_id.to_string()))
            .await?
            .take(0)?;
        Ok(result)
    }
}

/// SurrealDB preference repository
#[derive(Clone)]
pub struct SurrealPreferenceRepository {
    db: Surreal<Any>,
    _marker: PhantomData<Preference>,
}

impl SurrealPreferenceRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl PreferenceRepository for SurrealPreferenceRepository {
    async fn create(&self, preference: &Preference) -> Result<Preference> {
        let created: Option<Preference> = self
            .db
            .create(("preference", preference.id.clone()))
            .content(preference.clone())
            .await?;

        created.ok_or_else(|| {
            AppError::Database(format!("Failed to create preference: {}", preference.name))
        })
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Preference>> {
        let result: Vec<Preference> = self
            .db
            .query("SELECT * FROM preference WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?
            .take(0)?;
        Ok(result.into_iter().next())
    }

    async fn update(&self, id: &str, preference: &Preference) -> Result<Option<Preference>> {
        let updated: Option<Preference> = self
            .db
            .update(("preference", id.to_string()))
            .content(preference.clone())
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result: Option<Preference> = self.db.delete(("preference", id.to_string())).await?;
        Ok(result.is_some())
    }

    async fn list(&self) -> Result<Vec<Preference>> {
        let result: Vec<Preference> = self
            .db
            .query("SELECT * FROM preference ORDER BY name ASC")
            .await?
            .take(0)?;
        Ok(result)
    }
}

/// SurrealDB access token repository
#[derive(Clone)]
pub struct SurrealTokenRepository {
    db: Surreal<Any>,
    _marker: PhantomData<AccessToken>,
}

impl SurrealTokenRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl TokenRepository for SurrealTokenRepository {
    async fn create(&self, token: &AccessToken) -> Result<AccessToken> {
        let created: Option<AccessToken> = self
            .db
            .create(("access_token", token.id.clone()))
            .content(token.clone())
            .await?;

        created
            .ok_or_else(|| AppError::Database(format!("Failed to create token: {}", token.id)))
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccessToken>> {
        let result: Vec<AccessToken> = self
            .db
            .query("SELECT * FROM access_token WHERE token_hash = $hash LIMIT 1")
            .bind(("hash", token_hash.to_string()))
            .await?
            .take(0)?;
        Ok(result.into_iter().next())
    }

    async fn touch(&self, id: &str) -> Result<()> {
        self.db
            .query("UPDATE type::thing('access_token', $id) SET last_used_at = $now")
            .bind(("now", Utc::now()))
            .bind(("id", id.to_string()))
            .await?;
        Ok(())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool> {
        let deleted: Vec<AccessToken> = self
            .db
            .query("DELETE FROM access_token WHERE token_hash = $hash RETURN BEFORE")
            .bind(("hash", token_hash.to_string()))
            .await?
            .take(0)?;
        Ok(!deleted.is_empty())
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<()> {
        self.db
            .query("DELETE FROM access_token WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await?;
        Ok(())
    }
}

/// SurrealDB gate audit log repository
#[derive(Clone)]
pub struct SurrealAccessLogRepository {
    db: Surreal<Any>,
    _marker: PhantomData<KeyAccessLog>,
}

impl SurrealAccessLogRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl AccessLogRepository for SurrealAccessLogRepository {
    async fn create(&self, entry: &KeyAccessLog) -> Result<KeyAccessLog> {
        let created: Option<KeyAccessLog> = self
            .db
            .create(("key_access_log", entry.id.clone()))
            .content(entry.clone())
            .await?;

        created
            .ok_or_else(|| AppError::Database(format!("Failed to create log entry: {}", entry.id)))
    }

    async fn list(&self, limit: usize, start: usize) -> Result<Vec<KeyAccessLog>> {
        let result: Vec<KeyAccessLog> = self
            .db
            .query("SELECT * FROM key_access_log ORDER BY created_at DESC LIMIT $limit START $start")
            .bind(("limit", limit))
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(result)
    }
}

/// SurrealDB blacklist repository
#[derive(Clone)]
pub struct SurrealBlacklistRepository {
    db: Surreal<Any>,
    _marker: PhantomData<BlacklistEntry>,
}

impl SurrealBlacklistRepository {
    pub fn new(db: Surreal<Any>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl BlacklistRepository for SurrealBlacklistRepository {
    async fn create(&self, entry: &BlacklistEntry) -> Result<BlacklistEntry> {
        let created: Option<BlacklistEntry> = self
            .db
            .create(("auth_deleted", entry.id.clone()))
            .content(entry.clone())
            .await?;

        created.ok_or_else(|| {
            AppError::Database(format!("Failed to create blacklist entry: {}", entry.id))
        })
    }

    async fn contains(&self, email_hash: &str, username_hash: &str) -> Result<bool> {
        let result: Vec<serde_json::Value> = self
            .db
            .query(
                "SELECT count() FROM auth_deleted \
                 WHERE email_hash = $email OR username_hash = $username GROUP ALL",
            )
            .bind(("email", email_hash.to_string()))
            .bind(("username", username_hash.to_string()))
            .await?
            .take(0)?;
        Ok(count_from(result) > 0)
    }
}
