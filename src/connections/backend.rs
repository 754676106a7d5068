//! Durable storage for connection profiles.
//!
//! The on-disk format is a single JSON object mapping profile name to
//! `{"server": ..., "db_name": ...}`. Every save rewrites the whole document.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ConnectionProfile, ProfileError};

/// Loads and saves the full profile list.
pub trait ProfileBackend: Send + Sync {
    fn load(&self) -> Result<Vec<ConnectionProfile>, ProfileError>;

    fn save(&self, profiles: &[ConnectionProfile]) -> Result<(), ProfileError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    server: String,
    db_name: String,
}

/// JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ProfileBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<ConnectionProfile>, ProfileError> {
        if !self.path.exists() {
            log::info!(
                "No profile file at {}, starting with an empty store",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProfileError::persistence(format!("reading {}: {}", self.path.display(), e))
        })?;
        decode_profiles(&content)
    }

    fn save(&self, profiles: &[ConnectionProfile]) -> Result<(), ProfileError> {
        let content = encode_profiles(profiles)?;

        // Write next to the target and rename over it so readers never see a partial file.
        let staging = self.staging_path();
        fs::write(&staging, content).map_err(|e| {
            ProfileError::persistence(format!("writing {}: {}", staging.display(), e))
        })?;
        fs::rename(&staging, &self.path).map_err(|e| {
            ProfileError::persistence(format!("replacing {}: {}", self.path.display(), e))
        })?;

        log::debug!(
            "Saved {} connection profiles to {}",
            profiles.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the serialized document in memory. Used by tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    document: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: &[ConnectionProfile]) -> Result<Self, ProfileError> {
        let backend = Self::new();
        backend.save(profiles)?;
        Ok(backend)
    }

    /// Last document written, if any.
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ProfileBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<ConnectionProfile>, ProfileError> {
        match self.document() {
            Some(content) => decode_profiles(&content),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, profiles: &[ConnectionProfile]) -> Result<(), ProfileError> {
        let content = encode_profiles(profiles)?;
        let mut guard = self
            .document
            .lock()
            .map_err(|_| ProfileError::persistence("memory backend lock poisoned"))?;
        *guard = Some(content);
        Ok(())
    }
}

fn encode_profiles(profiles: &[ConnectionProfile]) -> Result<String, ProfileError> {
    let mut document = Map::new();
    for profile in profiles {
        let stored = StoredProfile {
            server: profile.server.clone(),
            db_name: profile.database.clone(),
        };
        let value = serde_json::to_value(stored)
            .map_err(|e| ProfileError::persistence(format!("encoding profiles: {}", e)))?;
        document.insert(profile.name.clone(), value);
    }

    serde_json::to_string_pretty(&Value::Object(document))
        .map_err(|e| ProfileError::persistence(format!("encoding profiles: {}", e)))
}

fn decode_profiles(content: &str) -> Result<Vec<ConnectionProfile>, ProfileError> {
    // `preserve_order` keeps the document's key order, which is the list order.
    let document: Map<String, Value> = serde_json::from_str(content)
        .map_err(|e| ProfileError::persistence(format!("parsing profiles: {}", e)))?;

    document
        .into_iter()
        .map(|(name, value)| {
            let stored: StoredProfile = serde_json::from_value(value).map_err(|e| {
                ProfileError::persistence(format!("parsing profile '{}': {}", name, e))
            })?;
            Ok(ConnectionProfile {
                name,
                server: stored.server,
                database: stored.db_name,
            })
        })
        .collect()
}
