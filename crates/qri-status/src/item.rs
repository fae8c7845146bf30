use std::path::PathBuf;

/// The classification of a single component's status (§4.F). A scanner-level
/// conflict takes precedence over the normal add/modify/unmodified/removed
/// classification and carries its own description (§4.F "problem precedence").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Add,
    Modified,
    Unmodified,
    Removed,
    Conflict(String),
}

/// One component's status against the stored snapshot (§4.F).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusItem {
    pub source_file: Option<PathBuf>,
    pub name: String,
    pub kind: StatusKind,
}
