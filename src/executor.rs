//! Runs work against a caller's active connection profile.
//!
//! Every call opens its own session and drops it before returning, on success
//! and on failure alike.

use std::sync::Arc;

use thiserror::Error;

use crate::connections::ConnectionProfile;
use crate::database::{
    ConnectionDescriptor, DatabaseError, DatabaseSession, OsIdentity, ResultRow, SessionFactory,
};
use crate::hop::{build_hop_query, transform_hops, HopGraph, HopLimit, HopSelector};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("No active connection selected")]
    NoActiveConnection,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Clone)]
pub struct QueryExecutor {
    factory: Arc<dyn SessionFactory>,
    identity: OsIdentity,
}

impl QueryExecutor {
    pub fn new(factory: Arc<dyn SessionFactory>, identity: OsIdentity) -> Self {
        Self { factory, identity }
    }

    pub fn identity(&self) -> &OsIdentity {
        &self.identity
    }

    /// Executes caller-supplied SQL as-is. No validation happens here; callers
    /// own the decision of who may reach this.
    pub async fn execute(
        &self,
        profile: Option<&ConnectionProfile>,
        sql: &str,
    ) -> Result<Vec<ResultRow>, ExecutionError> {
        let session = self.open(profile)?;
        let rows = session.fetch_rows(sql).await?;
        log::info!("Query returned {} rows", rows.len());
        Ok(rows)
    }

    /// Fetches the hop neighborhood for `selector` and reshapes it into a graph.
    pub async fn fetch_hop_graph(
        &self,
        profile: Option<&ConnectionProfile>,
        selector: &HopSelector,
        limit: HopLimit,
    ) -> Result<HopGraph, ExecutionError> {
        let query = build_hop_query(selector, limit);
        let session = self.open(profile)?;
        let rows = session.fetch_hops(&query).await?;
        drop(session);

        let graph = transform_hops(&rows);
        log::info!(
            "Hop query returned {} rows -> {} nodes, {} edges",
            rows.len(),
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    fn open(
        &self,
        profile: Option<&ConnectionProfile>,
    ) -> Result<Box<dyn DatabaseSession>, ExecutionError> {
        let profile = profile.ok_or(ExecutionError::NoActiveConnection)?;
        let descriptor = ConnectionDescriptor::new(profile, &self.identity);
        Ok(self.factory.open(&descriptor)?)
    }
}
