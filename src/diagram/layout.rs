//! Flow layout: weighted graph → drawable geometry.
//!
//! Column-stacking layout for the two- and three-tier graphs the deriver
//! produces: depth assignment by forward traversal (sinks justified to the
//! last column), per-column value-proportional vertical scaling, and one
//! link-ordering pass so ribbons leave and enter nodes without crossing at
//! the attachment point.

use std::collections::HashMap;

use crate::data::model::{FlowGraph, FlowKind};

// ---------------------------------------------------------------------------
// Index resolution
// ---------------------------------------------------------------------------

/// An edge with its endpoints resolved to node-list positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub kind: Option<FlowKind>,
}

/// Map edge endpoint names to indices into `graph.nodes`.
///
/// Resolution happens here, immediately before layout; the sanitizer only
/// deals in names. An edge naming an unlisted node is skipped rather than
/// reported — this stays a best-effort rendering path.
pub fn resolve_links(graph: &FlowGraph) -> Vec<ResolvedLink> {
    let index_of: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    graph
        .edges
        .iter()
        .filter_map(|e| {
            Some(ResolvedLink {
                source: *index_of.get(e.source.as_str())?,
                target: *index_of.get(e.target.as_str())?,
                value: e.value,
                kind: e.kind,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Layout geometry
// ---------------------------------------------------------------------------

/// Extent and spacing knobs, in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            width: 800.0,
            height: 500.0,
            node_width: 20.0,
            node_padding: 10.0,
        }
    }
}

/// A positioned node rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub name: String,
    pub index: usize,
    /// max(incoming, outgoing) flow through the node.
    pub value: f64,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// A positioned ribbon between two nodes.
///
/// `y0`/`y1` are the band centers at the source's right edge and the
/// target's left edge; the band spans ± `width / 2` around them.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkLayout {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub kind: Option<FlowKind>,
    pub width: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramLayout {
    pub nodes: Vec<NodeLayout>,
    pub links: Vec<LinkLayout>,
}

struct NodeSlot {
    out_links: Vec<usize>,
    in_links: Vec<usize>,
    value: f64,
    depth: usize,
    layer: usize,
    y0: f64,
    y1: f64,
}

/// Lay out a sanitized graph inside the given extent.
///
/// Total: degenerate input (no edges, all-zero values, or a cycle the
/// sanitizer lets through such as `X→Y, Y→X`) produces flat geometry, never
/// a panic or an error.
pub fn layout(graph: &FlowGraph, params: &LayoutParams) -> DiagramLayout {
    let links = resolve_links(graph);
    let n = graph.nodes.len();

    let mut slots: Vec<NodeSlot> = (0..n)
        .map(|_| NodeSlot {
            out_links: Vec::new(),
            in_links: Vec::new(),
            value: 0.0,
            depth: 0,
            layer: 0,
            y0: 0.0,
            y1: 0.0,
        })
        .collect();
    for (li, link) in links.iter().enumerate() {
        slots[link.source].out_links.push(li);
        slots[link.target].in_links.push(li);
    }
    for slot in &mut slots {
        let out_sum: f64 = slot.out_links.iter().map(|&li| links[li].value).sum();
        let in_sum: f64 = slot.in_links.iter().map(|&li| links[li].value).sum();
        slot.value = out_sum.max(in_sum);
    }

    compute_depths(&mut slots, &links);

    // Justify: sinks go to the last column.
    let max_depth = slots.iter().map(|s| s.depth).max().unwrap_or(0);
    let column_count = max_depth + 1;
    for slot in &mut slots {
        slot.layer = if slot.out_links.is_empty() {
            column_count - 1
        } else {
            slot.depth
        };
    }

    let kx = if column_count <= 1 {
        0.0
    } else {
        (params.width - params.node_width) / (column_count as f64 - 1.0)
    };

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
    for i in 0..n {
        columns[slots[i].layer].push(i);
    }

    // Vertical scale: the tightest column fills the height exactly.
    let max_len = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    let py = if max_len <= 1 {
        params.node_padding
    } else {
        params.node_padding.min(params.height / (max_len as f64 - 1.0))
    };
    let mut ky = f64::INFINITY;
    for col in &columns {
        let sum: f64 = col.iter().map(|&ni| slots[ni].value).sum();
        if sum <= 0.0 {
            continue;
        }
        ky = ky.min((params.height - (col.len() as f64 - 1.0) * py) / sum);
    }
    if !ky.is_finite() {
        ky = 0.0;
    }

    // Stack each column, then spread the slack evenly.
    for col in &columns {
        let mut y = 0.0;
        for &ni in col {
            slots[ni].y0 = y;
            slots[ni].y1 = y + slots[ni].value * ky;
            y = slots[ni].y1 + py;
        }
        if !col.is_empty() {
            let offset = (params.height - y + py) / (col.len() as f64 + 1.0);
            for (i, &ni) in col.iter().enumerate() {
                let adj = offset * (i as f64 + 1.0);
                slots[ni].y0 += adj;
                slots[ni].y1 += adj;
            }
        }
    }

    // Order ribbons at each node by the far endpoint's vertical position,
    // then stack them down the node face.
    let mut link_widths = vec![0.0f64; links.len()];
    let mut link_y0 = vec![0.0f64; links.len()];
    let mut link_y1 = vec![0.0f64; links.len()];
    for (li, link) in links.iter().enumerate() {
        link_widths[li] = link.value * ky;
    }
    // Snapshot node tops first; sorting a node's link list must not observe
    // partially updated neighbours.
    let y0s: Vec<f64> = slots.iter().map(|s| s.y0).collect();
    for slot in &mut slots {
        slot.out_links.sort_by(|&a, &b| {
            f64_cmp(y0s[links[a].target], y0s[links[b].target]).then(a.cmp(&b))
        });
        slot.in_links.sort_by(|&a, &b| {
            f64_cmp(y0s[links[a].source], y0s[links[b].source]).then(a.cmp(&b))
        });
    }
    for slot in &slots {
        let mut y = slot.y0;
        for &li in &slot.out_links {
            link_y0[li] = y + link_widths[li] / 2.0;
            y += link_widths[li];
        }
        let mut y = slot.y0;
        for &li in &slot.in_links {
            link_y1[li] = y + link_widths[li] / 2.0;
            y += link_widths[li];
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let x0 = slots[i].layer as f64 * kx;
            NodeLayout {
                name: name.clone(),
                index: i,
                value: slots[i].value,
                x0,
                y0: slots[i].y0,
                x1: x0 + params.node_width,
                y1: slots[i].y1,
            }
        })
        .collect();

    let out_links = links
        .iter()
        .enumerate()
        .map(|(li, link)| LinkLayout {
            source: link.source,
            target: link.target,
            value: link.value,
            kind: link.kind,
            width: link_widths[li],
            y0: link_y0[li],
            y1: link_y1[li],
        })
        .collect();

    DiagramLayout {
        nodes,
        links: out_links,
    }
}

/// Assign depths by forward traversal from the full node set.
///
/// Bounded at `n` rounds so a residual cycle (the sanitizer keeps
/// `X→Y, Y→X`) terminates with the last assigned depths instead of looping.
fn compute_depths(slots: &mut [NodeSlot], links: &[ResolvedLink]) {
    let n = slots.len();
    let mut current: Vec<usize> = (0..n).collect();
    let mut next: Vec<usize> = Vec::new();
    let mut next_seen = vec![false; n];
    let mut x: usize = 0;
    while !current.is_empty() && x <= n {
        for &ni in &current {
            slots[ni].depth = x;
            for &li in &slots[ni].out_links {
                let t = links[li].target;
                if !next_seen[t] {
                    next_seen[t] = true;
                    next.push(t);
                }
            }
        }
        x += 1;
        std::mem::swap(&mut current, &mut next);
        next.clear();
        next_seen.fill(false);
    }
}

fn f64_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FlowEdge;
    use crate::data::sanitize::sanitize;

    fn graph(edges: &[(&str, &str, f64)]) -> FlowGraph {
        let edges: Vec<FlowEdge> = edges
            .iter()
            .map(|(s, t, v)| FlowEdge::new(*s, *t, *v, None))
            .collect();
        sanitize(&edges, 0.0)
    }

    fn params() -> LayoutParams {
        LayoutParams {
            width: 800.0,
            height: 500.0,
            node_width: 20.0,
            node_padding: 10.0,
        }
    }

    #[test]
    fn resolve_maps_names_to_first_appearance_indices() {
        let g = graph(&[("A", "Fossil", 5.0), ("B", "Fossil", 3.0)]);
        let links = resolve_links(&g);
        assert_eq!(g.nodes, vec!["A", "Fossil", "B"]);
        assert_eq!(links[0].source, 0);
        assert_eq!(links[0].target, 1);
        assert_eq!(links[1].source, 2);
        assert_eq!(links[1].target, 1);
    }

    #[test]
    fn sinks_are_justified_to_the_last_column() {
        let g = graph(&[("A", "Fossil", 5.0), ("B", "Fossil", 3.0)]);
        let layout = layout(&g, &params());
        let a = &layout.nodes[0];
        let fossil = &layout.nodes[1];
        assert_eq!(a.x0, 0.0);
        assert_eq!(fossil.x0, 780.0);
        assert_eq!(fossil.x1, 800.0);
    }

    #[test]
    fn node_heights_are_value_proportional() {
        let g = graph(&[("A", "Fossil", 5.0), ("B", "Fossil", 3.0)]);
        let layout = layout(&g, &params());
        let height = |i: usize| layout.nodes[i].y1 - layout.nodes[i].y0;
        // A : B = 5 : 3, Fossil carries the full 8.
        assert!((height(0) / height(2) - 5.0 / 3.0).abs() < 1e-9);
        assert!((height(1) - (height(0) + height(2))).abs() < 1e-9);
    }

    #[test]
    fn geometry_stays_inside_the_extent() {
        let g = graph(&[
            ("A", "Fossil", 5.0),
            ("A", "Land", 2.0),
            ("B", "Fossil", 3.0),
            ("C", "Land", 1.0),
        ]);
        let layout = layout(&g, &params());
        for node in &layout.nodes {
            assert!(node.y0 >= -1e-9 && node.y1 <= 500.0 + 1e-9, "{node:?}");
            assert!(node.x0 >= 0.0 && node.x1 <= 800.0);
            assert!(node.y1 >= node.y0);
        }
    }

    #[test]
    fn link_widths_sum_to_node_height() {
        let g = graph(&[("A", "Fossil", 5.0), ("B", "Fossil", 3.0)]);
        let layout = layout(&g, &params());
        let fossil = &layout.nodes[1];
        let incoming: f64 = layout
            .links
            .iter()
            .filter(|l| l.target == 1)
            .map(|l| l.width)
            .sum();
        assert!((incoming - (fossil.y1 - fossil.y0)).abs() < 1e-9);
    }

    #[test]
    fn three_tier_graph_gets_three_columns() {
        let g = graph(&[
            ("Europe", "France", 4.0),
            ("France", "Fossil", 4.0),
            ("Asia", "China", 9.0),
            ("China", "Fossil", 9.0),
        ]);
        let layout = layout(&g, &params());
        let x_of = |name: &str| {
            layout
                .nodes
                .iter()
                .find(|n| n.name == name)
                .map(|n| n.x0)
                .unwrap()
        };
        assert!(x_of("Europe") < x_of("France"));
        assert!(x_of("France") < x_of("Fossil"));
        assert_eq!(x_of("Europe"), x_of("Asia"));
    }

    #[test]
    fn two_cycle_terminates_with_flat_geometry() {
        let g = graph(&[("X", "Y", 10.0), ("Y", "X", 5.0)]);
        let layout = layout(&g, &params());
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.links.len(), 2);
        for node in &layout.nodes {
            assert!(node.y0.is_finite() && node.y1.is_finite());
        }
    }

    #[test]
    fn empty_graph_lays_out_empty() {
        let layout = layout(&FlowGraph::default(), &params());
        assert!(layout.nodes.is_empty());
        assert!(layout.links.is_empty());
    }
}
