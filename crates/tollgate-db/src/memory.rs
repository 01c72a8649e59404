//! In-memory repositories
//!
//! `DashMap`-backed implementations of the store contract. Uniqueness of
//! emails and refresh tokens is enforced through the entry API, so concurrent
//! writers see the same conflicts a database constraint would report.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{DbError, DbResult};
use crate::models::{SessionRow, UserRow};
use crate::repo::{session_ttl, CreateSession, CreateUser, SessionRepository, UserRepository};

/// In-memory user repository
#[derive(Clone)]
pub struct MemoryUserRepository {
    by_email: Arc<DashMap<String, UserRow>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self {
            by_email: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        match self.by_email.entry(user.email) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation),
            Entry::Vacant(slot) => {
                let row = UserRow {
                    user_id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    email: slot.key().clone(),
                    password_hash: user.password_hash,
                };
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self.by_email.get(email).map(|r| r.value().clone()))
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> DbResult<()> {
        let mut user = self.by_email.get_mut(email).ok_or(DbError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

/// In-memory session repository
#[derive(Clone)]
pub struct MemorySessionRepository {
    by_token: Arc<DashMap<String, SessionRow>>,
    next_id: Arc<AtomicI64>,
    ttl: Duration,
}

impl Default for MemorySessionRepository {
    fn default() -> Self {
        Self {
            by_token: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
            ttl: session_ttl(),
        }
    }
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the store-side session lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Total number of stored sessions across all users
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        match self.by_token.entry(session.refresh_token) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let row = SessionRow {
                    session_id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    user_id: session.user_id,
                    refresh_token: slot.key().clone(),
                    created_at: now,
                    expires_at: now
                        .checked_add_signed(self.ttl)
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                };
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn exists(&self, refresh_token: &str) -> DbResult<bool> {
        Ok(self.by_token.contains_key(refresh_token))
    }

    async fn delete(&self, refresh_token: &str) -> DbResult<u64> {
        Ok(u64::from(self.by_token.remove(refresh_token).is_some()))
    }

    async fn find_by_user_id(&self, user_id: i64) -> DbResult<Vec<SessionRow>> {
        let mut sessions: Vec<SessionRow> = self
            .by_token
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.session_id.cmp(&a.session_id));
        Ok(sessions)
    }

    async fn delete_expired(&self) -> DbResult<u64> {
        let now = Utc::now();
        let mut removed = 0u64;
        self.by_token.retain(|_, s| {
            let live = s.expires_at >= now;
            if !live {
                removed += 1;
            }
            live
        });
        Ok(removed)
    }
}
