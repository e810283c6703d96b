//! In-memory test doubles shared by the integration suites.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use warden::error::{AppError, Result};
use warden::models::blacklist::BlacklistEntry;
use warden::models::token::AccessToken;
use warden::models::user::User;
use warden::services::email::{Mailer, OutboundEmail};
use warden::storage::repository::{BlacklistRepository, TokenRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    pub users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn with_users(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(users),
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        self.users.lock().unwrap().push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == identifier || u.username.as_deref() == Some(identifier))
            .cloned())
    }

    async fn update(&self, id: &str, user: &User) -> Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_deleted)
            .cloned()
            .collect())
    }

    async fn count_by_role(&self, role: &str) -> Result<u64> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role.as_deref() == Some(role))
            .count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryTokenRepository {
    pub tokens: Mutex<Vec<AccessToken>>,
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, token: &AccessToken) -> Result<AccessToken> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(token.clone())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<AccessToken>> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn touch(&self, id: &str) -> Result<()> {
        if let Some(token) = self.tokens.lock().unwrap().iter_mut().find(|t| t.id == id) {
            token.last_used_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn delete_by_hash(&self, token_hash: &str) -> Result<bool> {
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.token_hash != token_hash);
        Ok(tokens.len() < before)
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<()> {
        self.tokens.lock().unwrap().retain(|t| t.user_id != user_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryBlacklistRepository {
    pub entries: Mutex<Vec<BlacklistEntry>>,
}

#[async_trait]
impl BlacklistRepository for InMemoryBlacklistRepository {
    async fn create(&self, entry: &BlacklistEntry) -> Result<BlacklistEntry> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry.clone())
    }

    async fn contains(&self, email_hash: &str, username_hash: &str) -> Result<bool> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.email_hash == email_hash || e.username_hash == username_hash))
    }
}

/// Mailer that records every outgoing message
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

impl RecordingMailer {
    /// Pull the one-time code out of the last email body
    pub fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let body = &sent.last()?.body;
        let start = body.find("<strong>")? + "<strong>".len();
        let end = body[start..].find("</strong>")? + start;
        Some(body[start..end].to_string())
    }
}

/// Status and business code of an error
pub fn code_of(err: &AppError) -> (u16, String) {
    err.into()
}
