use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

/// Direction in which a sort rule chains its key groups.
///
/// - `Ascending`: the group with the smallest key runs first (default).
/// - `Descending`: the group with the largest key runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Ascending
    }
}

impl SortOrder {
    /// Apply this order to a natural comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            other => Err(format!(
                "invalid sort order: {other} (expected \"ascending\" or \"descending\")"
            )),
        }
    }
}

/// State of one ordered `(predecessor, successor)` cell in the edge matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeState {
    /// No edge.
    #[default]
    None,
    /// A committed dependency edge.
    Connected,
    /// Committing this edge would close a cycle through already connected
    /// tasks.
    WouldCreateCycle,
}
