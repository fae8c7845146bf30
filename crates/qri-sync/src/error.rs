#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("session {0} not found")]
    UnknownSession(String),
    #[error("at most two sync sessions may be active at once")]
    TooManySessions,
    #[error("block {id} is not in the outstanding set for session {sid}")]
    NotOutstanding { sid: String, id: String },
    #[error("session {0} deadline elapsed")]
    DeadlineElapsed(String),
    #[error("session {0} was cancelled")]
    Cancelled(String),
    #[error("block {id} exhausted its retry budget: {reason}")]
    RetryBudgetExhausted { id: String, reason: String },
    #[error("session aborted by receiver on block {id}: {reason}")]
    Aborted { id: String, reason: String },
    #[error(transparent)]
    Manifest(#[from] qri_manifest::ManifestError),
    #[error(transparent)]
    Collab(#[from] qri_collab::CollabError),
    #[error("transport error: {0}")]
    Transport(String),
}
