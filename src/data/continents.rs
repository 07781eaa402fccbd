//! Static country → continent classification.

// ---------------------------------------------------------------------------
// Category map
// ---------------------------------------------------------------------------

/// Fixed mapping from country names (as they appear in the source table) to
/// continents. Loaded once as constant configuration, never mutated.
pub const CONTINENT_TABLE: &[(&str, &str)] = &[
    // Africa
    ("Algeria", "Africa"),
    ("Angola", "Africa"),
    ("Democratic Republic of Congo", "Africa"),
    ("Egypt", "Africa"),
    ("Ethiopia", "Africa"),
    ("Ghana", "Africa"),
    ("Kenya", "Africa"),
    ("Libya", "Africa"),
    ("Morocco", "Africa"),
    ("Mozambique", "Africa"),
    ("Nigeria", "Africa"),
    ("South Africa", "Africa"),
    ("Sudan", "Africa"),
    ("Tanzania", "Africa"),
    ("Zambia", "Africa"),
    // Asia
    ("Bangladesh", "Asia"),
    ("China", "Asia"),
    ("India", "Asia"),
    ("Indonesia", "Asia"),
    ("Iran", "Asia"),
    ("Iraq", "Asia"),
    ("Japan", "Asia"),
    ("Kazakhstan", "Asia"),
    ("Malaysia", "Asia"),
    ("Myanmar", "Asia"),
    ("Pakistan", "Asia"),
    ("Philippines", "Asia"),
    ("Saudi Arabia", "Asia"),
    ("Singapore", "Asia"),
    ("South Korea", "Asia"),
    ("Taiwan", "Asia"),
    ("Thailand", "Asia"),
    ("Turkey", "Asia"),
    ("United Arab Emirates", "Asia"),
    ("Uzbekistan", "Asia"),
    ("Vietnam", "Asia"),
    // Europe
    ("Austria", "Europe"),
    ("Belarus", "Europe"),
    ("Belgium", "Europe"),
    ("Czechia", "Europe"),
    ("Finland", "Europe"),
    ("France", "Europe"),
    ("Germany", "Europe"),
    ("Greece", "Europe"),
    ("Hungary", "Europe"),
    ("Ireland", "Europe"),
    ("Italy", "Europe"),
    ("Netherlands", "Europe"),
    ("Norway", "Europe"),
    ("Poland", "Europe"),
    ("Portugal", "Europe"),
    ("Romania", "Europe"),
    ("Russia", "Europe"),
    ("Spain", "Europe"),
    ("Sweden", "Europe"),
    ("Switzerland", "Europe"),
    ("Ukraine", "Europe"),
    ("United Kingdom", "Europe"),
    // North America
    ("Canada", "North America"),
    ("Cuba", "North America"),
    ("Dominican Republic", "North America"),
    ("Guatemala", "North America"),
    ("Honduras", "North America"),
    ("Mexico", "North America"),
    ("Nicaragua", "North America"),
    ("Panama", "North America"),
    ("United States", "North America"),
    // South America
    ("Argentina", "South America"),
    ("Bolivia", "South America"),
    ("Brazil", "South America"),
    ("Chile", "South America"),
    ("Colombia", "South America"),
    ("Ecuador", "South America"),
    ("Paraguay", "South America"),
    ("Peru", "South America"),
    ("Venezuela", "South America"),
    // Oceania
    ("Australia", "Oceania"),
    ("New Zealand", "Oceania"),
    ("Papua New Guinea", "Oceania"),
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Result of classifying an entity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A known country, mapped to its continent.
    Continent(&'static str),
    /// A real entity the table does not cover.
    Unknown,
    /// An aggregate pseudo-row ("World", GCP buckets, "excl." variants)
    /// that must not participate in grouping at all.
    Excluded,
}

/// Classify an entity name against the continent table.
///
/// Aggregate rows are recognised by naming pattern and excluded before the
/// table lookup, so an aggregate never falls through to `Unknown`.
pub fn classify(entity: &str) -> Classification {
    if is_aggregate(entity) {
        return Classification::Excluded;
    }
    CONTINENT_TABLE
        .iter()
        .find(|(country, _)| *country == entity)
        .map(|(_, continent)| Classification::Continent(continent))
        .unwrap_or(Classification::Unknown)
}

/// Whether a row is an aggregate rather than a single country.
fn is_aggregate(entity: &str) -> bool {
    entity == "World" || entity.contains("GCP") || entity.contains("excl.")
}
