//! hopgraph - connection profiles, ad-hoc SQL and hop-graph views over a graph-shaped database
//!
//! This crate provides:
//! - Named connection profiles persisted to a JSON file, with a per-session active selection
//! - Ad-hoc SQL execution against the active profile
//! - Single-hop neighborhood retrieval from the `graph.hop` adjacency table
//! - Reshaping of adjacency rows into deduplicated node/edge data for graph visualization

pub mod config;
pub mod connections;
pub mod database;
pub mod executor;
pub mod hop;
pub mod server;
