//! The `Stats` value shared between the stats cache (§4.J) and the status
//! engine's body comparison (§4.F), plus the cheap `BodySummary` digest the
//! latter actually compares.

/// The scalar type a column was inferred to hold. `Null` covers columns where
/// every observed value was JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

/// Per-column descriptor produced by schema/stats inference over a body.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColumnStats {
    pub title: String,
    pub kind: ScalarKind,
    pub count: u64,
    pub null_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_count_approx: Option<u64>,
}

/// Ordered per-column statistics for one body.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    pub columns: Vec<ColumnStats>,
}

/// The cheap digest the status engine's body comparison actually consults
/// (§4.F, §9): two bodies are equal iff both `entries`/`total_size` match and
/// every column's stats match.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BodySummary {
    pub entries: u64,
    pub total_size: u64,
    pub columns: Stats,
}
