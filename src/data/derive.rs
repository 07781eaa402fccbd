//! Record deriver: rows → weighted flow edges.

use super::continents::{classify, Classification};
use super::model::{EmissionRow, FlowEdge, FlowKind};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which two tiers the diagram connects.
///
/// One topology per invocation; the deriver never mixes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// country → "Fossil" / "Land"
    EntityToKind,
    /// continent → country, one edge per emission component
    ContinentToEntity,
}

/// Configuration for a single derivation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeriveOptions {
    pub topology: Topology,
    /// Retain only the K highest-ranked entities, per continent in grouped
    /// mode and globally in flat mode. `None` keeps everything.
    pub top_k: Option<usize>,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        DeriveOptions {
            topology: Topology::EntityToKind,
            top_k: None,
        }
    }
}

/// Node names of the emission-type tier in flat topology.
pub const FOSSIL_NODE: &str = "Fossil";
pub const LAND_NODE: &str = "Land";

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive flow edges for one year of the dataset.
///
/// Rows are filtered to an exact year match; a year with no rows yields an
/// empty edge list, not an error. Each retained row contributes up to two
/// edges, one per emission component; a component with value ≤ 0 is never
/// emitted, so a row with both components ≤ 0 contributes nothing.
pub fn derive(rows: &[EmissionRow], year: i32, options: &DeriveOptions) -> Vec<FlowEdge> {
    let mut retained: Vec<(Option<&'static str>, &EmissionRow)> = rows
        .iter()
        .filter(|r| r.year == year)
        .filter_map(|r| match options.topology {
            Topology::EntityToKind => Some((None, r)),
            Topology::ContinentToEntity => match classify(&r.entity) {
                Classification::Continent(c) => Some((Some(c), r)),
                // Unknown and aggregate rows are dropped entirely.
                Classification::Unknown | Classification::Excluded => None,
            },
        })
        .collect();

    if let Some(k) = options.top_k {
        retained = top_k_per_group(retained, k);
    }

    let mut edges = Vec::with_capacity(retained.len() * 2);
    for (continent, row) in retained {
        let (fossil_edge, land_edge) = match continent {
            // grouped: continent → country, once per component
            Some(c) => (
                FlowEdge::new(c, row.entity.clone(), row.fossil, Some(FlowKind::Fossil)),
                FlowEdge::new(c, row.entity.clone(), row.land_use, Some(FlowKind::LandUse)),
            ),
            // flat: country → emission type
            None => (
                FlowEdge::new(
                    row.entity.clone(),
                    FOSSIL_NODE,
                    row.fossil,
                    Some(FlowKind::Fossil),
                ),
                FlowEdge::new(
                    row.entity.clone(),
                    LAND_NODE,
                    row.land_use,
                    Some(FlowKind::LandUse),
                ),
            ),
        };
        // Zero and negative components are excluded, not emitted empty.
        if fossil_edge.value > 0.0 {
            edges.push(fossil_edge);
        }
        if land_edge.value > 0.0 {
            edges.push(land_edge);
        }
    }
    edges
}

/// Keep the K highest-ranked rows per group.
///
/// Ranking is by `fossil + land_use` descending; the sort is stable, so two
/// rows with equal scores keep their input order and top-K selection is
/// deterministic across repeated runs. Flat mode has a single implicit group.
fn top_k_per_group<'a>(
    mut retained: Vec<(Option<&'static str>, &'a EmissionRow)>,
    k: usize,
) -> Vec<(Option<&'static str>, &'a EmissionRow)> {
    retained.sort_by(|a, b| b.1.total().partial_cmp(&a.1.total()).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept = Vec::with_capacity(retained.len().min(k));
    let mut counts: std::collections::HashMap<Option<&'static str>, usize> =
        std::collections::HashMap::new();
    for (group, row) in retained {
        let seen = counts.entry(group).or_insert(0);
        if *seen < k {
            *seen += 1;
            kept.push((group, row));
        }
    }
    kept
}
