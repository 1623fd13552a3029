// src/services/session.rs

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::auth::User;

// Sessão aberta no login; o token carrega o `id` como `sid`
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user: User,
    pub started_at: DateTime<Utc>,
    // Relógio do tokio: a expiração segue o mesmo tempo dos pollers
    pub expires_at: Instant,
}

impl Session {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Sessões ativas, por id. Vive no AppState (não é global).
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessões valem `ttl` a partir do login, como o `exp` do token.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn begin(&self, user: User) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            user,
            started_at: Utc::now(),
            expires_at: Instant::now() + self.ttl,
        };
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id, session.clone());
        session
    }

    /// Sessão vencida conta como encerrada; a remoção fica com `end_expired`.
    pub fn get(&self, id: Uuid) -> Option<Session> {
        let now = Instant::now();
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .filter(|s| !s.is_expired(now))
            .cloned()
    }

    pub fn end(&self, id: Uuid) -> Option<Session> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Encerra todas as sessões de uma empresa (bloqueio ou exclusão).
    /// Devolve os ids encerrados.
    pub fn end_all_for_company(&self, company_id: Uuid) -> Vec<Uuid> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let ended: Vec<Uuid> = sessions
            .values()
            .filter(|s| s.user.company_id == company_id)
            .map(|s| s.id)
            .collect();
        for id in &ended {
            sessions.remove(id);
        }
        ended
    }

    /// Remove as sessões vencidas e devolve os ids removidos.
    pub fn end_expired(&self) -> Vec<Uuid> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let expired: Vec<Uuid> = sessions
            .values()
            .filter(|s| s.is_expired(now))
            .map(|s| s.id)
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
