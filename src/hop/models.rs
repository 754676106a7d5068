use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// Column list of `graph.hop`, in the order [`HopRow`] decodes them.
pub const HOP_COLUMNS: [&str; 9] = [
    "v_id",
    "v_label_en",
    "v_type",
    "hop_next_v_id",
    "hop_next_v_label_en",
    "hop_next_v_type",
    "e_id",
    "e_type",
    "hop_edge_direction",
];

/// One directed adjacency record from `graph.hop`.
///
/// Fields are decoded positionally, so the struct order must match
/// [`HOP_COLUMNS`]. A result set missing any of these columns fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Row, Serialize, Deserialize)]
pub struct HopRow {
    pub v_id: String,
    pub v_label_en: String,
    pub v_type: String,
    pub hop_next_v_id: String,
    pub hop_next_v_label_en: String,
    pub hop_next_v_type: String,
    pub e_id: String,
    pub e_type: String,
    pub hop_edge_direction: String,
}

impl HopRow {
    pub fn source_node(&self) -> GraphNode {
        GraphNode {
            id: self.v_id.clone(),
            label: self.v_label_en.clone(),
            node_type: self.v_type.clone(),
        }
    }

    pub fn neighbor_node(&self) -> GraphNode {
        GraphNode {
            id: self.hop_next_v_id.clone(),
            label: self.hop_next_v_label_en.clone(),
            node_type: self.hop_next_v_type.clone(),
        }
    }

    /// Raw adjacency tuple used for edge deduplication, taken before the
    /// direction is resolved.
    pub fn adjacency_key(&self) -> (&str, &str, &str, &str, &str) {
        (
            &self.v_id,
            &self.hop_edge_direction,
            &self.hop_next_v_id,
            &self.e_id,
            &self.e_type,
        )
    }

    pub fn direction(&self) -> Option<EdgeDirection> {
        EdgeDirection::parse(&self.hop_edge_direction)
    }
}

/// Which stored column pair carries the true source -> target orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// `v_id` is the source, `hop_next_v_id` the target.
    Default,
    /// `hop_next_v_id` is the source, `v_id` the target.
    Inverse,
}

impl EdgeDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(EdgeDirection::Default),
            "inverse" => Some(EdgeDirection::Inverse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDirection::Default => "default",
            EdgeDirection::Inverse => "inverse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub source: String,
    pub target: String,
}

/// Deduplicated, direction-resolved neighborhood graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl HopGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Visualization element wrapper: every node and edge is nested under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element<T> {
    pub data: T,
}

/// Wire shape returned by `GET /hops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphElements {
    pub nodes: Vec<Element<GraphNode>>,
    pub edges: Vec<Element<GraphEdge>>,
}

impl From<HopGraph> for GraphElements {
    fn from(graph: HopGraph) -> Self {
        GraphElements {
            nodes: graph.nodes.into_iter().map(|data| Element { data }).collect(),
            edges: graph.edges.into_iter().map(|data| Element { data }).collect(),
        }
    }
}
