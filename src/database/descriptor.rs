//! Connection descriptor derived from a profile and the operating-system identity.
//!
//! Nothing here is ever persisted: port, driver and authentication mode are
//! fixed, and the user comes from the current OS account.

use std::env;
use std::fmt;

use crate::connections::ConnectionProfile;

pub const DB_PORT: u16 = 8123;
pub const DB_DRIVER: &str = "clickhouse-http";
pub const DB_AUTH: &str = "ActiveDirectoryInteractive";

/// Current OS user and (optional) domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsIdentity {
    pub user: String,
    pub domain: Option<String>,
}

impl OsIdentity {
    pub fn new(user: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            user: user.into(),
            domain,
        }
    }

    /// Reads `USER` (or `USERNAME` on Windows) and `USERDOMAIN`.
    pub fn current() -> Self {
        let user = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        let domain = env::var("USERDOMAIN").ok().filter(|d| !d.is_empty());
        Self { user, domain }
    }

    /// `user@domain`, domain lowercased; bare user when no domain is known.
    pub fn principal(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}@{}", self.user, domain.to_lowercase()),
            None => self.user.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub server: String,
    pub database: String,
    pub port: u16,
    pub user: String,
    pub driver: &'static str,
    pub authentication: &'static str,
}

impl ConnectionDescriptor {
    pub fn new(profile: &ConnectionProfile, identity: &OsIdentity) -> Self {
        Self {
            server: profile.server.clone(),
            database: profile.database.clone(),
            port: DB_PORT,
            user: identity.principal(),
            driver: DB_DRIVER,
            authentication: DB_AUTH,
        }
    }

    /// HTTP endpoint the client talks to.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.server, self.port)
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clickhouse://{}@{}:{}/{}?driver={}&authentication={}",
            self.user, self.server, self.port, self.database, self.driver, self.authentication
        )
    }
}
