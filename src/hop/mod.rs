//! Single-hop neighborhood retrieval over the `graph.hop` adjacency table.
//!
//! - `query_builder`: selector precedence and the parameterized adjacency query
//! - `transform`: adjacency rows to a deduplicated, direction-resolved graph
//! - `models`: row, node, edge and wire types

pub mod models;
pub mod query_builder;
pub mod transform;

pub use models::{
    EdgeDirection, Element, GraphEdge, GraphElements, GraphNode, HopGraph, HopRow, HOP_COLUMNS,
};
pub use query_builder::{
    build_hop_query, HopLimit, HopParam, HopQuery, HopSelector, InvalidLimit, DEFAULT_HOP_LIMIT,
};
pub use transform::transform_hops;
