#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
