//! Database sessions.
//!
//! A [`SessionFactory`] opens one [`DatabaseSession`] per request from a
//! [`ConnectionDescriptor`]. Sessions hold no state beyond the request; dropping
//! one releases it.

mod clickhouse_client;
pub mod descriptor;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::hop::{HopQuery, HopRow};

pub use clickhouse_client::{ClickHouseSession, ClickHouseSessionFactory};
pub use descriptor::{ConnectionDescriptor, OsIdentity, DB_AUTH, DB_DRIVER, DB_PORT};

/// One result row, column name to value, in column order.
pub type ResultRow = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Clickhouse Error: {0}")]
    Client(#[from] clickhouse::error::Error),
    #[error("Clickhouse Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode result row: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait DatabaseSession: Send + Sync {
    /// Runs `sql` unchanged and returns every row.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<ResultRow>, DatabaseError>;

    /// Runs a hop query, binding its parameters in order.
    async fn fetch_hops(&self, query: &HopQuery) -> Result<Vec<HopRow>, DatabaseError>;
}

pub trait SessionFactory: Send + Sync {
    fn open(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Box<dyn DatabaseSession>, DatabaseError>;
}
