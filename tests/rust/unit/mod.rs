//! Unit tests - public-API properties of the hop-graph pipeline

mod hop_graph_properties;
