#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("no dataset component files found")]
    NoDatasetFiles,
    #[error("{0} component has no source file to load")]
    NoSourceFile(String),
    #[error("unsupported format {0:?} for this component")]
    FormatUnsupported(String),
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error(transparent)]
    Fill(#[from] qri_filler::FillError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Collab(#[from] qri_collab::CollabError),
}
