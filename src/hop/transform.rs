//! Hop-to-graph transformation
//!
//! Reshapes flat adjacency rows into a deduplicated node list and a
//! direction-resolved edge list. Node order is the source triples of all rows
//! followed by the neighbor triples; edge order is every `default` edge
//! followed by every `inverse` edge.

use std::collections::HashSet;

use super::models::{EdgeDirection, GraphEdge, HopGraph, HopRow};

pub fn transform_hops(rows: &[HopRow]) -> HopGraph {
    let mut nodes = Vec::new();
    let mut seen_nodes = HashSet::new();

    // Full (id, label, type) equality; conflicting labels for one id are not reconciled.
    let candidates = rows
        .iter()
        .map(HopRow::source_node)
        .chain(rows.iter().map(HopRow::neighbor_node));
    for node in candidates {
        if !seen_nodes.contains(&node) {
            seen_nodes.insert(node.clone());
            nodes.push(node);
        }
    }

    let mut default_edges = Vec::new();
    let mut inverse_edges = Vec::new();
    let mut seen_edges = HashSet::new();

    for row in rows {
        if !seen_edges.insert(row.adjacency_key()) {
            continue;
        }

        match row.direction() {
            Some(EdgeDirection::Default) => default_edges.push(GraphEdge {
                id: row.e_id.clone(),
                edge_type: row.e_type.clone(),
                source: row.v_id.clone(),
                target: row.hop_next_v_id.clone(),
            }),
            Some(EdgeDirection::Inverse) => inverse_edges.push(GraphEdge {
                id: row.e_id.clone(),
                edge_type: row.e_type.clone(),
                source: row.hop_next_v_id.clone(),
                target: row.v_id.clone(),
            }),
            None => {
                log::debug!(
                    "Dropping edge '{}': unrecognized direction '{}'",
                    row.e_id,
                    row.hop_edge_direction
                );
            }
        }
    }

    default_edges.extend(inverse_edges);

    HopGraph {
        nodes,
        edges: default_edges,
    }
}
