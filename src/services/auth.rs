//! Authentication service
//!
//! Login and opaque-token issuance, bearer-token resolution, password
//! update, and the password-reset / email-verification token handshakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::models::token::AccessToken;
use crate::models::user::User;
use crate::security::keys::{generate_token, safe_compare, sha256_hex};
use crate::security::password::{hash_password, verify_password};
use crate::security::rate_limit::{RateLimitConfig, RateLimitDecision, RateLimiter};
use crate::services::email::{Mailer, OutboundEmail, html_template};
use crate::storage::repository::{TokenRepository, UserRepository};

const USER_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const RESET_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
const VERIFY_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Successful login payload
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Clear token value; shown to the client exactly once
    pub token: String,
    pub user: User,
}

/// Authentication operations
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, identifier: &str, password: &str, ip: &str) -> Result<LoginResult>;
    /// Resolve a bearer token to its user
    async fn authenticate(&self, token: &str) -> Result<User>;
    async fn logout(&self, token: &str) -> Result<()>;
    async fn revoke_all(&self, user_id: &str) -> Result<()>;
    async fn me(&self, user_id: &str) -> Result<User>;
    async fn update_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()>;
    async fn request_password_reset(&self, email: &str, ip: &str) -> Result<()>;
    async fn confirm_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
        ip: &str,
    ) -> Result<()>;
    async fn request_email_verification(&self, email: &str, ip: &str) -> Result<()>;
    async fn confirm_email_verification(&self, email: &str, token: &str, ip: &str) -> Result<()>;
}

pub struct AuthServiceImpl {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    cache: Arc<dyn CacheStore>,
    mailer: Arc<dyn Mailer>,
    login_limiter: RateLimiter,
    reset_limiter: RateLimiter,
    verify_limiter: RateLimiter,
}

impl AuthServiceImpl {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        cache: Arc<dyn CacheStore>,
        mailer: Arc<dyn Mailer>,
        limits: RateLimitConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            cache: cache.clone(),
            mailer,
            login_limiter: RateLimiter::new(cache.clone(), limits.clone()).with_prefix("login"),
            reset_limiter: RateLimiter::new(cache.clone(), limits.clone()).with_prefix("reset"),
            verify_limiter: RateLimiter::new(cache, limits).with_prefix("verify"),
        }
    }

    fn user_cache_key(user_id: &str) -> String {
        format!("user:{}", user_id)
    }

    async fn cache_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(serialized) => {
                if let Err(e) = self
                    .cache
                    .set(&Self::user_cache_key(&user.id), &serialized, Some(USER_CACHE_TTL))
                    .await
                {
                    warn!(user_id = %user.id, error = %e, "failed to cache user");
                }
            }
            Err(e) => warn!(user_id = %user.id, error = %e, "failed to serialize user for cache"),
        }
    }

    async fn purge_user_cache(&self, user_id: &str) {
        let keys = [Self::user_cache_key(user_id), "users".to_string()];
        if let Err(e) = self.cache.delete_many(&keys).await {
            warn!(user_id = %user_id, error = %e, "failed to purge user cache");
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<Option<User>> {
        if let Some(cached) = self.cache.get(&Self::user_cache_key(user_id)).await? {
            if let Ok(user) = serde_json::from_str::<User>(&cached) {
                return Ok(Some(user));
            }
        }

        let user = self.users.get_by_id(user_id).await?;
        if let Some(user) = &user {
            self.cache_user(user).await;
        }
        Ok(user)
    }

    /// Best-effort dispatch; a relay outage must not break the auth flow
    async fn send_email(&self, email: OutboundEmail) {
        if let Err(e) = self.mailer.send(&email).await {
            warn!(to = %email.to, error = %e, "failed to dispatch email");
        }
    }

    fn invalid_credentials() -> AppError {
        AppError::business(401, "INVALID_CREDENTIALS", "Invalid credentials")
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn login(&self, identifier: &str, password: &str, ip: &str) -> Result<LoginResult> {
        if identifier.is_empty() || password.is_empty() {
            return Err(Self::invalid_credentials());
        }

        let identifier = identifier.trim().to_lowercase();

        match self.login_limiter.check(&identifier, ip).await? {
            RateLimitDecision::Blocked { .. } => {
                return Err(AppError::business(
                    403,
                    "LOGIN_TEMP_BLOCKED",
                    "Account temporarily blocked after repeated login attempts",
                ));
            }
            RateLimitDecision::JustBlocked { .. } => {
                return Err(AppError::business(
                    429,
                    "LOGIN_RATE_LIMIT",
                    "Too many login attempts. Please try again later.",
                ));
            }
            RateLimitDecision::Allowed { .. } => {}
        }

        let user = self.users.get_by_identifier(&identifier).await?;

        let Some(user) = user.filter(|u| u.is_usable()) else {
            self.login_limiter.record_attempt(&identifier, ip).await?;
            return Err(Self::invalid_credentials());
        };

        if !verify_password(password, &user.password_hash)? {
            self.login_limiter.record_attempt(&identifier, ip).await?;
            return Err(Self::invalid_credentials());
        }

        self.login_limiter.clear_attempts(&identifier, ip).await?;

        let clear_token = generate_token();
        self.tokens
            .create(&AccessToken::new(&user.id, &sha256_hex(&clear_token)))
            .await?;

        let mut user = user;
        user.last_login_at = Some(Utc::now());
        user.last_ip = Some(ip.to_string());
        user.touch();
        let user = self
            .users
            .update(&user.id, &user)
            .await?
            .unwrap_or(user);

        self.cache_user(&user).await;
        debug!(user_id = %user.id, "login succeeded");

        Ok(LoginResult {
            token: clear_token,
            user,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<User> {
        let record = self
            .tokens
            .find_by_hash(&sha256_hex(token))
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid or revoked token".to_string()))?;

        let user = self
            .load_user(&record.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid or revoked token".to_string()))?;

        if !user.is_usable() {
            return Err(AppError::business(403, "USER_INACTIVE", "User is inactive"));
        }

        if let Err(e) = self.tokens.touch(&record.id).await {
            warn!(token_id = %record.id, error = %e, "failed to touch token");
        }

        Ok(user)
    }

    async fn logout(&self, token: &str) -> Result<()> {
        self.tokens.delete_by_hash(&sha256_hex(token)).await?;
        Ok(())
    }

    async fn revoke_all(&self, user_id: &str) -> Result<()> {
        self.tokens.delete_for_user(user_id).await?;
        self.purge_user_cache(user_id).await;
        Ok(())
    }

    async fn me(&self, user_id: &str) -> Result<User> {
        let user = self
            .load_user(user_id)
            .await?
            .ok_or_else(|| AppError::business(404, "USER_NOT_FOUND", "User not found"))?;

        if !user.is_usable() {
            return Err(AppError::business(403, "USER_INACTIVE", "User is inactive"));
        }

        Ok(user)
    }

    async fn update_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::business(404, "USER_NOT_FOUND", "User not found"))?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::business(
                400,
                "INVALID_CURRENT_PASSWORD",
                "Current password is invalid",
            ));
        }

        user.password_hash = hash_password(new_password)?;
        user.touch();
        self.users.update(&user.id, &user).await?;
        self.purge_user_cache(&user.id).await;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str, ip: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let user = self.users.get_by_email(&email).await?;
        let usable_user = user.filter(|u| u.is_usable());

        // The response is identical on every path so callers cannot probe
        // which addresses exist.
        match self.reset_limiter.check(&email, ip).await? {
            RateLimitDecision::Blocked { .. } => return Ok(()),
            RateLimitDecision::JustBlocked { .. } => {
                if let Some(user) = &usable_user {
                    self.send_email(OutboundEmail {
                        to: user.email.clone(),
                        subject: "Suspicious password reset activity".to_string(),
                        body: html_template(
                            "Suspicious activity",
                            &format!(
                                "<p>Hello {},</p>\
                                 <p>We detected repeated password reset attempts.</p>\
                                 <p><strong>IP:</strong> {}</p>\
                                 <p>If this was not you, we recommend changing your password \
                                 immediately.</p>",
                                user.name, ip
                            ),
                        ),
                        html: true,
                        ..Default::default()
                    })
                    .await;
                }
                return Ok(());
            }
            RateLimitDecision::Allowed { .. } => {}
        }

        self.reset_limiter.record_attempt(&email, ip).await?;

        let Some(user) = usable_user else {
            return Ok(());
        };

        let token = generate_token();
        self.cache
            .set(
                &format!("reset:{}", email),
                &sha256_hex(&token),
                Some(RESET_TOKEN_TTL),
            )
            .await?;

        self.send_email(OutboundEmail {
            to: user.email.clone(),
            subject: "Password recovery".to_string(),
            body: html_template(
                "Password recovery",
                &format!(
                    "<p>Hello {},</p>\
                     <p>Use the code below to reset your password:</p>\
                     <p><strong>{}</strong></p>\
                     <p>Valid for 15 minutes.</p>",
                    user.name, token
                ),
            ),
            html: true,
            ..Default::default()
        })
        .await;

        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
        ip: &str,
    ) -> Result<()> {
        let email = email.trim().to_lowercase();
        let key = format!("reset:{}", email);

        let stored_hash = self.cache.get(&key).await?.ok_or_else(|| {
            AppError::business(400, "RESET_TOKEN_INVALID", "Invalid or expired token")
        })?;

        if !safe_compare(&stored_hash, &sha256_hex(token)) {
            return Err(AppError::business(
                400,
                "RESET_TOKEN_INVALID",
                "Invalid or expired token",
            ));
        }

        let mut user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::business(404, "USER_NOT_FOUND", "User not found"))?;

        if !user.is_usable() {
            return Err(AppError::business(403, "USER_INACTIVE", "User is inactive"));
        }

        user.password_hash = hash_password(new_password)?;
        user.touch();
        self.users.update(&user.id, &user).await?;

        self.tokens.delete_for_user(&user.id).await?;
        self.cache
            .delete_many(&[
                key,
                format!("reset:attempts:{}:{}", email, ip),
                format!("reset:blocked:{}:{}", email, ip),
            ])
            .await?;
        self.purge_user_cache(&user.id).await;

        self.send_email(OutboundEmail {
            to: user.email.clone(),
            subject: "Password changed".to_string(),
            body: html_template(
                "Password changed",
                &format!(
                    "<p>Hello {},</p>\
                     <p>Your password was changed successfully.</p>\
                     <p><strong>IP:</strong> {}</p>\
                     <p>If this was not you, contact support immediately.</p>",
                    user.name, ip
                ),
            ),
            html: true,
            ..Default::default()
        })
        .await;

        Ok(())
    }

    async fn request_email_verification(&self, email: &str, ip: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let user = self.users.get_by_email(&email).await?;
        let usable_user = user.filter(|u| u.is_usable());

        // The response stays uniform; crossing the limit notifies the
        // account owner instead of dispatching another code.
        match self.verify_limiter.check(&email, ip).await? {
            RateLimitDecision::Blocked { .. } => return Ok(()),
            RateLimitDecision::JustBlocked { .. } => {
                if let Some(user) = &usable_user {
                    self.send_email(OutboundEmail {
                        to: user.email.clone(),
                        subject: "Suspicious email verification activity".to_string(),
                        body: html_template(
                            "Suspicious activity",
                            &format!(
                                "<p>Hello {},</p>\
                                 <p>We detected repeated email verification attempts.</p>\
                                 <p><strong>IP:</strong> {}</p>\
                                 <p>If this was not you, contact support immediately.</p>",
                                user.name, ip
                            ),
                        ),
                        html: true,
                        ..Default::default()
                    })
                    .await;
                }
                return Ok(());
            }
            RateLimitDecision::Allowed { .. } => {}
        }

        self.verify_limiter.record_attempt(&email, ip).await?;

        let Some(user) = usable_user else {
            return Ok(());
        };

        let token = generate_token();
        self.cache
            .set(
                &format!("verify_email:{}", email),
                &sha256_hex(&token),
                Some(VERIFY_TOKEN_TTL),
            )
            .await?;

        self.send_email(OutboundEmail {
            to: user.email.clone(),
            subject: "Email verification".to_string(),
            body: html_template(
                "Email verification",
                &format!(
                    "<p>Hello {},</p>\
                     <p>Use the code below to verify your email address:</p>\
                     <p><strong>{}</strong></p>\
                     <p>Valid for 24 hours. If you did not create an account, ignore this \
                     message.</p>",
                    user.name, token
                ),
            ),
            html: true,
            ..Default::default()
        })
        .await;

        Ok(())
    }

    async fn confirm_email_verification(&self, email: &str, token: &str, ip: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let key = format!("verify_email:{}", email);

        let stored_hash = self.cache.get(&key).await?.ok_or_else(|| {
            AppError::business(400, "VERIFY_TOKEN_INVALID", "Invalid or expired token")
        })?;

        if !safe_compare(&stored_hash, &sha256_hex(token)) {
            return Err(AppError::business(
                400,
                "VERIFY_TOKEN_INVALID",
                "Invalid or expired token",
            ));
        }

        let mut user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::business(404, "USER_NOT_FOUND", "User not found"))?;

        user.email_verified_at = Some(Utc::now());
        user.touch();
        self.users.update(&user.id, &user).await?;

        self.cache
            .delete_many(&[
                key,
                format!("verify:attempts:{}:{}", email, ip),
                format!("verify:blocked:{}:{}", email, ip),
            ])
            .await?;
        self.purge_user_cache(&user.id).await;

        Ok(())
    }
}

/// Build the default auth service
pub fn create_auth_service(
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    cache: Arc<dyn CacheStore>,
    mailer: Arc<dyn Mailer>,
    limits: RateLimitConfig,
) -> Arc<dyn AuthService> {
    Arc::new(AuthServiceImpl::new(users, tokens, cache, mailer, limits))
}
