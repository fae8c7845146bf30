#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    Component(#[from] qri_dataset::ComponentError),
    #[error(transparent)]
    Collab(#[from] qri_collab::CollabError),
    #[error(transparent)]
    Cache(#[from] qri_statscache::CacheError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
