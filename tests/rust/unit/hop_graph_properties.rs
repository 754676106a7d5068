//! Order-independent properties of `transform_hops` and the hop query pipeline.

use std::collections::HashSet;

use hopgraph::hop::{
    build_hop_query, transform_hops, GraphEdge, GraphNode, HopLimit, HopRow, HopSelector,
};

fn row(v: &str, next: &str, edge: &str, direction: &str) -> HopRow {
    HopRow {
        v_id: v.to_string(),
        v_label_en: format!("{} label", v),
        v_type: "Vertex".to_string(),
        hop_next_v_id: next.to_string(),
        hop_next_v_label_en: format!("{} label", next),
        hop_next_v_type: "Vertex".to_string(),
        e_id: edge.to_string(),
        e_type: "linked".to_string(),
        hop_edge_direction: direction.to_string(),
    }
}

fn sample() -> Vec<HopRow> {
    vec![
        row("A", "V1", "E1", "default"),
        row("B", "V1", "E2", "inverse"),
        row("A", "V1", "E1", "default"),
        row("C", "A", "E3", "default"),
        row("C", "D", "E4", "unknown"),
    ]
}

fn as_sets(rows: &[HopRow]) -> (HashSet<GraphNode>, HashSet<GraphEdge>) {
    let graph = transform_hops(rows);
    (
        graph.nodes.into_iter().collect(),
        graph.edges.into_iter().collect(),
    )
}

#[test]
fn test_transform_is_idempotent() {
    let rows = sample();
    assert_eq!(as_sets(&rows), as_sets(&rows));
}

#[test]
fn test_transform_ignores_row_order() {
    let rows = sample();
    let mut reversed = rows.clone();
    reversed.reverse();
    assert_eq!(as_sets(&rows), as_sets(&reversed));
}

#[test]
fn test_output_has_no_duplicates() {
    let graph = transform_hops(&sample());
    let node_set: HashSet<_> = graph.nodes.iter().collect();
    let edge_set: HashSet<_> = graph.edges.iter().collect();
    assert_eq!(node_set.len(), graph.nodes.len());
    assert_eq!(edge_set.len(), graph.edges.len());
}

#[test]
fn test_shared_neighbor_is_one_node() {
    let graph = transform_hops(&sample());
    assert_eq!(graph.nodes.iter().filter(|n| n.id == "V1").count(), 1);
}

#[test]
fn test_inverse_row_resolves_direction() {
    let graph = transform_hops(&[row("A", "B", "E1", "inverse")]);
    assert_eq!(
        graph.edges,
        vec![GraphEdge {
            id: "E1".to_string(),
            edge_type: "linked".to_string(),
            source: "B".to_string(),
            target: "A".to_string(),
        }]
    );
}

#[test]
fn test_every_edge_endpoint_is_a_node() {
    let graph = transform_hops(&sample());
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert!(graph
        .edges
        .iter()
        .all(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str())));
    // E4 has an unrecognized direction and is dropped.
    assert!(graph.edges.iter().all(|e| e.id != "E4"));
}

#[test]
fn test_empty_input() {
    let graph = transform_hops(&[]);
    assert!(graph.nodes.is_empty() && graph.edges.is_empty());
}

#[test]
fn test_id_selector_beats_substring() {
    let selector = HopSelector::from_params(Some("A"), None, Some("label"));
    let query = build_hop_query(&selector, HopLimit::default());
    assert!(query.sql.contains("WHERE v_id = {v_id:String}"));
    assert!(!query.sql.contains("LIKE"));
}
