//! Browser sessions
//!
//! Each browser carries a `hopgraph_session` cookie. The middleware issues one
//! when it is missing and exposes the id to handlers as a [`SessionId`]
//! extension. The [`SessionRegistry`] keeps each session's active profile.

use std::collections::HashMap;

use axum::{
    extract::Request,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::connections::SessionContext;

pub const SESSION_COOKIE: &str = "hopgraph_session";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

/// Sessions kept before the least recently stored one is evicted.
pub const MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionEntry {
    context: SessionContext,
    stamp: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<SessionId, SessionEntry>,
    next_stamp: u64,
}

/// Only sessions with an active profile are kept; a session without one is
/// indistinguishable from a new session.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<Sessions>,
    capacity: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Snapshot of the session's context; unknown sessions start empty.
    pub async fn context(&self, id: &SessionId) -> SessionContext {
        self.sessions
            .read()
            .await
            .entries
            .get(id)
            .map(|entry| entry.context.clone())
            .unwrap_or_default()
    }

    pub async fn store(&self, id: SessionId, context: SessionContext) {
        let mut sessions = self.sessions.write().await;
        if context.active().is_none() {
            sessions.entries.remove(&id);
            return;
        }

        let stamp = sessions.next_stamp;
        sessions.next_stamp += 1;
        sessions.entries.insert(id, SessionEntry { context, stamp });

        if sessions.entries.len() > self.capacity {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stamp)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                log::debug!("Session registry full, evicting session {}", oldest.0);
                sessions.entries.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Unsets `profile` in every session that has it active.
    pub async fn forget_profile(&self, profile: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.entries.len();
        sessions
            .entries
            .retain(|_, entry| !entry.context.forget(profile));
        let cleared = before - sessions.entries.len();
        if cleared > 0 {
            log::debug!(
                "Cleared deleted profile '{}' from {} sessions",
                profile,
                cleared
            );
        }
        cleared
    }
}

/// Reads the session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionId(value.to_string()))
}

/// Middleware attaching a [`SessionId`] to every request.
pub async fn ensure_session(mut request: Request, next: Next) -> Response {
    let (id, issued) = match session_id_from_headers(request.headers()) {
        Some(id) => (id, false),
        None => (SessionId(Uuid::new_v4().to_string()), true),
    };

    request.extensions_mut().insert(id.clone());
    let mut response = next.run(request).await;

    if issued {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id.0);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => log::warn!("Could not encode session cookie: {}", e),
        }
    }

    response
}
