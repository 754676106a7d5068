use async_trait::async_trait;
use clickhouse::Client;
use tokio::io::AsyncBufReadExt;

use super::{ConnectionDescriptor, DatabaseError, DatabaseSession, ResultRow, SessionFactory};
use crate::hop::{HopQuery, HopRow};

/// Builds a client per descriptor. The HTTP client is cheap to construct and
/// holds no open connection until a query runs.
#[derive(Debug, Clone, Default)]
pub struct ClickHouseSessionFactory;

impl SessionFactory for ClickHouseSessionFactory {
    fn open(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Box<dyn DatabaseSession>, DatabaseError> {
        log::debug!("Opening database session: {}", descriptor);
        Ok(Box::new(ClickHouseSession::new(descriptor)))
    }
}

pub struct ClickHouseSession {
    client: Client,
}

impl ClickHouseSession {
    pub fn new(descriptor: &ConnectionDescriptor) -> Self {
        let client = Client::default()
            .with_url(descriptor.endpoint())
            .with_user(&descriptor.user)
            .with_database(&descriptor.database)
            .with_option("join_use_nulls", "1");
        Self::from_client(client)
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatabaseSession for ClickHouseSession {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<ResultRow>, DatabaseError> {
        log::debug!("Executing SQL:\n{}", sql);

        // The client appends its own FORMAT clause, which cannot follow a `;`.
        // `?` is a bind placeholder to the client; `??` passes a literal `?` through.
        let escaped = statement_text(sql).replace('?', "??");
        let mut lines = self
            .client
            .query(&escaped)
            .fetch_bytes("JSONEachRow")
            .map_err(|e| {
                log::error!("ClickHouse query failed. SQL was:\n{}\nError: {}", sql, e);
                DatabaseError::Client(e)
            })?
            .lines();

        let mut rows = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(|e| {
            log::error!(
                "ClickHouse response parsing failed. SQL was:\n{}\nError: {}",
                sql,
                e
            );
            DatabaseError::Io(e)
        })? {
            let row: ResultRow = serde_json::from_str(&line)?;
            rows.push(row);
        }

        Ok(rows)
    }

    async fn fetch_hops(&self, query: &HopQuery) -> Result<Vec<HopRow>, DatabaseError> {
        log::debug!(
            "Executing hop query:\n{}\nParameters: {:?}",
            query.sql,
            query.params
        );

        let mut pending = self.client.query(&query.sql);
        for param in &query.params {
            pending = pending.param(param.name, param.value.as_str());
        }

        pending.fetch_all::<HopRow>().await.map_err(|e| {
            log::error!(
                "ClickHouse hop query failed. SQL was:\n{}\nError: {}",
                query.sql,
                e
            );
            DatabaseError::Client(e)
        })
    }
}

/// The statement without trailing semicolons or whitespace.
fn statement_text(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}
