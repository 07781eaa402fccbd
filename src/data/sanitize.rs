//! Flow sanitizer: raw edge list → renderable `FlowGraph`.

use std::collections::HashSet;

use super::model::{FlowEdge, FlowGraph};

/// Clean a derived edge list for layout.
///
/// Steps run in a fixed order; the node list is built from the raw input
/// before anything is dropped, so node ordering does not depend on the
/// active threshold:
///
/// 1. collect distinct names in first-appearance order (source, then target,
///    per edge),
/// 2. drop self-loops — the layout side cannot place a zero-length flow,
///    and grouping can accidentally map an entity onto itself,
/// 3. deduplicate by `(source, target)`, keeping the first occurrence
///    (first-wins; values are not summed),
/// 4. when `min_value > 0`, drop edges with `value < min_value`.
///
/// Malformed or empty input produces an empty graph, never a failure.
pub fn sanitize(edges: &[FlowEdge], min_value: f64) -> FlowGraph {
    let mut nodes: Vec<String> = Vec::new();
    let mut seen_nodes: HashSet<&str> = HashSet::new();
    for edge in edges {
        if seen_nodes.insert(edge.source.as_str()) {
            nodes.push(edge.source.clone());
        }
        if seen_nodes.insert(edge.target.as_str()) {
            nodes.push(edge.target.clone());
        }
    }

    let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
    let cleaned: Vec<FlowEdge> = edges
        .iter()
        .filter(|e| e.source != e.target)
        .filter(|e| seen_pairs.insert((e.source.as_str(), e.target.as_str())))
        .filter(|e| min_value <= 0.0 || e.value >= min_value)
        .cloned()
        .collect();

    FlowGraph {
        nodes,
        edges: cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::{derive, DeriveOptions, Topology};
    use crate::data::model::{EmissionRow, FlowKind};

    fn edge(source: &str, target: &str, value: f64) -> FlowEdge {
        FlowEdge::new(source, target, value, None)
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let graph = sanitize(&[], 0.0);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn self_loops_are_removed() {
        let graph = sanitize(&[edge("X", "X", 5.0), edge("X", "Y", 1.0)], 0.0);
        assert!(graph.edges.iter().all(|e| e.source != e.target));
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn duplicate_pairs_keep_first_occurrence() {
        let graph = sanitize(
            &[edge("X", "Y", 10.0), edge("X", "Y", 20.0), edge("Y", "X", 5.0)],
            0.0,
        );
        // (Y,X) is not a duplicate of (X,Y); the second (X,Y) is dropped
        // without summing.
        assert_eq!(graph.edges, vec![edge("X", "Y", 10.0), edge("Y", "X", 5.0)]);
    }

    #[test]
    fn threshold_drops_small_edges() {
        let graph = sanitize(&[edge("A", "B", 1.0), edge("A", "C", 3.0)], 2.0);
        assert_eq!(graph.edges, vec![edge("A", "C", 3.0)]);
        assert!(graph.edges.iter().all(|e| e.value >= 2.0));
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let edges = [edge("A", "B", 0.5)];
        assert_eq!(sanitize(&edges, 0.0).edges.len(), 1);
    }

    #[test]
    fn node_order_is_first_appearance_source_then_target() {
        let graph = sanitize(
            &[edge("B", "C", 1.0), edge("A", "B", 1.0), edge("A", "D", 1.0)],
            0.0,
        );
        assert_eq!(graph.nodes, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn node_list_includes_endpoints_of_dropped_edges() {
        // The node list is built before self-loop/threshold filtering.
        let graph = sanitize(&[edge("X", "X", 5.0), edge("A", "B", 0.5)], 1.0);
        assert_eq!(graph.nodes, vec!["X", "A", "B"]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn sanitizing_twice_is_identity() {
        let graph = sanitize(
            &[edge("X", "Y", 10.0), edge("X", "Y", 20.0), edge("Y", "Z", 5.0)],
            3.0,
        );
        let again = sanitize(&graph.edges, 3.0);
        assert_eq!(again, graph);
    }

    #[test]
    fn grouped_pipeline_emits_one_europe_edge() {
        // France maps to Europe; the aggregate row is excluded by the
        // deriver; the France fossil and land edges share the
        // (Europe, France) pair, so first-wins keeps exactly one.
        let rows = vec![
            EmissionRow {
                entity: "France".into(),
                year: 2020,
                fossil: 4.0,
                land_use: 1.0,
            },
            EmissionRow {
                entity: "Europe (GCP)".into(),
                year: 2020,
                fossil: 40.0,
                land_use: 10.0,
            },
        ];
        let edges = derive(
            &rows,
            2020,
            &DeriveOptions {
                topology: Topology::ContinentToEntity,
                top_k: None,
            },
        );
        let graph = sanitize(&edges, 0.0);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, "Europe");
        assert_eq!(graph.edges[0].target, "France");
        assert_eq!(graph.edges[0].kind, Some(FlowKind::Fossil));
    }
}
