//! # Connection Profiles
//!
//! Named `{server, database}` pairs that queries run against.
//!
//! The profile list is shared and persisted through a [`ProfileBackend`]. Which
//! profile is *active* is not global: it lives in a [`SessionContext`] owned by
//! the caller (one per browser session on the HTTP side), so two sessions can
//! select different profiles without racing.
//!
//! Every mutation rewrites the whole persisted document. The in-memory view is
//! only updated after the write succeeds.

pub mod backend;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use backend::{JsonFileBackend, MemoryBackend, ProfileBackend};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    pub server: String,
    pub database: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProfileError {
    #[error("Connection '{name}' already exists")]
    AlreadyExists { name: String },
    #[error("Connection '{name}' not found")]
    NotFound { name: String },
    #[error("Failed to persist connection profiles: {message}")]
    Persistence { message: String },
}

impl ProfileError {
    pub fn persistence(message: impl Into<String>) -> Self {
        ProfileError::Persistence {
            message: message.into(),
        }
    }

    fn not_found(name: &str) -> Self {
        ProfileError::NotFound {
            name: name.to_string(),
        }
    }
}

/// Per-caller state: which profile serves this caller's queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    active: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Unsets the active profile if it is `name`. Returns whether it was.
    pub fn forget(&mut self, name: &str) -> bool {
        if self.active.as_deref() == Some(name) {
            self.active = None;
            true
        } else {
            false
        }
    }
}

pub struct ConnectionManager {
    profiles: Vec<ConnectionProfile>,
    backend: Box<dyn ProfileBackend>,
}

impl ConnectionManager {
    /// Loads the persisted profiles. The backend stays the source of truth.
    pub fn load(backend: Box<dyn ProfileBackend>) -> Result<Self, ProfileError> {
        let profiles = backend.load()?;
        log::info!("Loaded {} connection profiles", profiles.len());
        Ok(Self { profiles, backend })
    }

    /// Profile names in stored order.
    pub fn list(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn add(&mut self, name: &str, server: &str, database: &str) -> Result<(), ProfileError> {
        if self.get(name).is_some() {
            return Err(ProfileError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let mut next = self.profiles.clone();
        next.push(ConnectionProfile {
            name: name.to_string(),
            server: server.to_string(),
            database: database.to_string(),
        });
        self.commit(next)?;

        log::info!("Added connection profile '{}' ({}/{})", name, server, database);
        Ok(())
    }

    /// Removes `name`, unsetting it in `session` if it was active there.
    pub fn delete(&mut self, name: &str, session: &mut SessionContext) -> Result<(), ProfileError> {
        if self.get(name).is_none() {
            return Err(ProfileError::not_found(name));
        }

        let next = self
            .profiles
            .iter()
            .filter(|p| p.name != name)
            .cloned()
            .collect();
        self.commit(next)?;
        session.forget(name);

        log::info!("Deleted connection profile '{}'", name);
        Ok(())
    }

    pub fn select(&self, name: &str, session: &mut SessionContext) -> Result<(), ProfileError> {
        if self.get(name).is_none() {
            return Err(ProfileError::not_found(name));
        }
        session.active = Some(name.to_string());
        log::debug!("Selected connection profile '{}'", name);
        Ok(())
    }

    /// The session's active profile, if it is set and still exists.
    pub fn active_profile(&self, session: &SessionContext) -> Option<&ConnectionProfile> {
        session.active().and_then(|name| self.get(name))
    }

    fn commit(&mut self, next: Vec<ConnectionProfile>) -> Result<(), ProfileError> {
        self.backend.save(&next)?;
        self.profiles = next;
        Ok(())
    }
}
