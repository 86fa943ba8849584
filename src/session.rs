//! Admin sessions: one shared password, server-side session table.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "portal_sid";

const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid password")]
    InvalidCredential,
    #[error("Failed to generate session id")]
    Rng,
}

pub struct SessionStore {
    /// Keyed with a per-process random secret; holds the tag of the admin password.
    key: hmac::Key,
    password_tag: hmac::Tag,
    rng: SystemRandom,
    ttl: Duration,
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl SessionStore {
    pub fn new(admin_password: &str, ttl_seconds: u64) -> Result<Self, SessionError> {
        let rng = SystemRandom::new();
        let key = hmac::Key::generate(hmac::HMAC_SHA256, &rng).map_err(|_| SessionError::Rng)?;
        let password_tag = hmac::sign(&key, admin_password.as_bytes());
        let ttl = Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64);

        Ok(Self {
            key,
            password_tag,
            rng,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check the password in constant time and open a session on success.
    pub async fn login(&self, password: &str) -> Result<String, SessionError> {
        hmac::verify(&self.key, password.as_bytes(), self.password_tag.as_ref())
            .map_err(|_| SessionError::InvalidCredential)?;

        let mut raw = [0u8; 32];
        self.rng.fill(&mut raw).map_err(|_| SessionError::Rng)?;
        let id = URL_SAFE_NO_PAD.encode(raw);

        self.sessions
            .write()
            .await
            .insert(id.clone(), Utc::now() + self.ttl);
        Ok(id)
    }

    pub async fn logout(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    /// Whether `id` names a live session. Expired entries are dropped.
    pub async fn is_admin(&self, id: &str) -> bool {
        let expires_at = match self.sessions.read().await.get(id) {
            Some(expires_at) => *expires_at,
            None => return false,
        };
        if expires_at > Utc::now() {
            return true;
        }
        self.sessions.write().await.remove(id);
        false
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, expires_at| *expires_at > now);
        before - sessions.len()
    }

    #[cfg(test)]
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Find a cookie value in a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

pub fn session_cookie(id: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds()
    )
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
