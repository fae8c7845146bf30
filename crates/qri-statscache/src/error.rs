#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("no cached stats for this key")]
    Miss,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to decode stats cache index: {0}")]
    Decode(#[from] bincode::Error),
}
