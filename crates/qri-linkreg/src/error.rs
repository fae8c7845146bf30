#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("{alias} is already linked to {dir}")]
    AlreadyLinked { alias: String, dir: String },
    #[error("no link found for directory {0}")]
    NotFound(String),
    #[error("marker file in {dir} references {found:?}, expected {expected:?}")]
    MarkerMismatch {
        dir: String,
        found: String,
        expected: String,
    },
    #[error("directory {0} has no link marker file")]
    MissingMarker(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to decode link registry: {0}")]
    Decode(#[from] bincode::Error),
}
