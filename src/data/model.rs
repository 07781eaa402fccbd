use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// EmissionRow – one observation of the source table
// ---------------------------------------------------------------------------

/// A single observation: one entity in one year.
///
/// `fossil` is non-negative in the source data; `land_use` may be negative
/// (net land-use sequestration).
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRow {
    pub entity: String,
    pub year: i32,
    /// Annual CO₂ emissions from fossil sources, in tonnes.
    pub fossil: f64,
    /// Annual CO₂ emissions from land-use change, in tonnes.
    pub land_use: f64,
}

impl EmissionRow {
    /// Combined emission score used for top-K ranking.
    pub fn total(&self) -> f64 {
        self.fossil + self.land_use
    }
}

// ---------------------------------------------------------------------------
// EmissionDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with a pre-computed year index.
#[derive(Debug, Clone, Default)]
pub struct EmissionDataset {
    /// All rows, in file order.
    pub rows: Vec<EmissionRow>,
    /// Sorted distinct years present in `rows`.
    pub years: Vec<i32>,
}

impl EmissionDataset {
    /// Build the year index from the loaded rows.
    pub fn from_rows(rows: Vec<EmissionRow>) -> Self {
        let years: BTreeSet<i32> = rows.iter().map(|r| r.year).collect();
        EmissionDataset {
            rows,
            years: years.into_iter().collect(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FlowEdge – one weighted flow of the diagram
// ---------------------------------------------------------------------------

/// Which emission field an edge carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Fossil,
    LandUse,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Fossil => write!(f, "Fossil"),
            FlowKind::LandUse => write!(f, "Land"),
        }
    }
}

/// A weighted directed flow between two named nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub kind: Option<FlowKind>,
}

impl FlowEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        value: f64,
        kind: Option<FlowKind>,
    ) -> Self {
        FlowEdge {
            source: source.into(),
            target: target.into(),
            value,
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// FlowGraph – sanitized (nodes, edges) pair
// ---------------------------------------------------------------------------

/// The cleaned node/edge pair handed to the diagram side.
///
/// Nodes are referenced by name and kept in order of first appearance;
/// index assignment happens just before layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of all edge values (used for the top-bar summary).
    pub fn total_flow(&self) -> f64 {
        self.edges.iter().map(|e| e.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_index_is_sorted_and_distinct() {
        let ds = EmissionDataset::from_rows(vec![
            EmissionRow {
                entity: "A".into(),
                year: 2020,
                fossil: 1.0,
                land_use: 0.0,
            },
            EmissionRow {
                entity: "B".into(),
                year: 1990,
                fossil: 1.0,
                land_use: 0.0,
            },
            EmissionRow {
                entity: "C".into(),
                year: 2020,
                fossil: 1.0,
                land_use: 0.0,
            },
        ]);
        assert_eq!(ds.years, vec![1990, 2020]);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn total_is_fossil_plus_land_use() {
        let row = EmissionRow {
            entity: "A".into(),
            year: 2020,
            fossil: 5.0,
            land_use: -2.0,
        };
        assert_eq!(row.total(), 3.0);
    }
}
