//! Receiver-side session pool (§4.I): opens sessions against a diff manifest,
//! accepts blocks for them, and enforces per-session deadlines plus the
//! "at most two sessions" limit.

use crate::error::SyncError;
use crate::response::PutBlockResponse;
use crate::session::{Session, SessionConfig, SessionState};
use qri_collab::BlockStore;
use qri_manifest::Manifest;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::time::sleep;

const MAX_CONCURRENT_SESSIONS: usize = 2;

struct Entry {
    session: Session,
    cancel: Arc<Notify>,
}

pub struct SessionPool<B> {
    block_store: Arc<Mutex<B>>,
    config: SessionConfig,
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
}

impl<B: BlockStore + Send + 'static> SessionPool<B> {
    pub fn new(block_store: B, config: SessionConfig) -> SessionPool<B> {
        SessionPool {
            block_store: Arc::new(Mutex::new(block_store)),
            config,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// §4.I step 1: compute which of `manifest.nodes` this receiver is
    /// missing and open a new session tracking them.
    pub fn request_session(&self, manifest: &Manifest) -> Result<(String, Manifest), SyncError> {
        let mut sessions = self.sessions.lock().unwrap();
        reap_expired(&mut sessions);

        let active = sessions
            .values()
            .filter(|e| e.session.state == SessionState::Active)
            .count();
        if active >= MAX_CONCURRENT_SESSIONS {
            return Err(SyncError::TooManySessions);
        }

        let diff = {
            let store = self.block_store.lock().unwrap();
            manifest.missing_from(|id| store.has(id))
        };

        let sid = uuid::Uuid::new_v4().to_string();
        let session = Session::new(sid.clone(), diff.clone(), self.config.deadline);
        let cancel = Arc::new(Notify::new());

        self.spawn_deadline_timer(sid.clone(), self.config.deadline, cancel.clone());
        tracing::info!(sid = %sid, missing = diff.nodes.len(), "opened sync session");
        sessions.insert(sid.clone(), Entry { session, cancel });

        Ok((sid, diff))
    }

    fn spawn_deadline_timer(&self, sid: String, deadline: Duration, cancel: Arc<Notify>) {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sleep(deadline) => {
                    let mut sessions = sessions.lock().unwrap();
                    if sessions.remove(&sid).is_some() {
                        tracing::warn!(%sid, "session deadline elapsed; cancelling");
                    }
                }
                _ = cancel.notified() => {
                    // Session already reached a terminal state on its own.
                }
            }
        });
    }

    /// §4.I step 2: accept one block for `sid`.
    pub fn put_block(&self, sid: &str, id: &str, data: &[u8]) -> PutBlockResponse {
        let mut sessions = self.sessions.lock().unwrap();

        let response;
        let mut should_remove = false;

        match sessions.get_mut(sid) {
            None => return PutBlockResponse::errored(id, "unknown session"),
            Some(entry) => {
                if entry.session.state != SessionState::Active {
                    return PutBlockResponse::errored(id, "session is not active");
                }
                if !entry.session.missing.contains(id) {
                    return PutBlockResponse::errored(id, "block is not outstanding for this session");
                }

                let put_result = {
                    let mut store = self.block_store.lock().unwrap();
                    store.put(id, data)
                };

                response = match put_result {
                    Ok(()) => {
                        entry.session.missing.remove(id);
                        if entry.session.missing.is_empty() {
                            entry.session.state = SessionState::Complete;
                            entry.cancel.notify_one();
                            should_remove = true;
                            tracing::info!(sid, "sync session complete");
                        }
                        PutBlockResponse::ok(id)
                    }
                    Err(err) => {
                        tracing::debug!(sid, id, error = %err, "block store rejected block; asking sender to retry");
                        PutBlockResponse::retry(id, err.to_string())
                    }
                };
            }
        }

        if should_remove {
            sessions.remove(sid);
        }

        response
    }

    /// Number of sessions currently tracked, for tests and diagnostics.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

fn reap_expired(sessions: &mut HashMap<String, Entry>) {
    let now = Instant::now();
    sessions.retain(|sid, entry| {
        let expired = entry.session.is_expired(now) && entry.session.state == SessionState::Active;
        if expired {
            tracing::warn!(%sid, "reaping expired session");
            entry.cancel.notify_one();
        }
        !expired
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use qri_collab::fakes::InMemoryBlockStore;
    use std::time::Duration;

    fn manifest(nodes: &[&str]) -> Manifest {
        Manifest {
            links: Vec::new(),
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn request_session_diffs_against_block_store() {
        let mut store = InMemoryBlockStore::new();
        store.put("a", b"present").unwrap();
        let pool = SessionPool::new(store, SessionConfig::default());

        let (_sid, diff) = pool.request_session(&manifest(&["a", "b"])).unwrap();
        assert_eq!(diff.nodes, vec!["b"]);
    }

    #[tokio::test]
    async fn put_block_completes_session_once_all_arrive() {
        let pool = SessionPool::new(InMemoryBlockStore::new(), SessionConfig::default());
        let (sid, diff) = pool.request_session(&manifest(&["a", "b"])).unwrap();
        assert_eq!(diff.nodes.len(), 2);

        let r1 = pool.put_block(&sid, "a", b"1");
        assert_eq!(r1.status, crate::response::PutBlockStatus::Ok);
        assert_eq!(pool.session_count(), 1);

        let r2 = pool.put_block(&sid, "b", b"2");
        assert_eq!(r2.status, crate::response::PutBlockStatus::Ok);
        assert_eq!(pool.session_count(), 0);
    }

    #[tokio::test]
    async fn put_block_for_unknown_session_is_errored() {
        let pool = SessionPool::new(InMemoryBlockStore::new(), SessionConfig::default());
        let response = pool.put_block("nope", "a", b"1");
        assert_eq!(response.status, crate::response::PutBlockStatus::Errored);
    }

    #[tokio::test]
    async fn put_block_outside_outstanding_set_is_errored() {
        let pool = SessionPool::new(InMemoryBlockStore::new(), SessionConfig::default());
        let (sid, _diff) = pool.request_session(&manifest(&["a"])).unwrap();
        let response = pool.put_block(&sid, "not-in-diff", b"1");
        assert_eq!(response.status, crate::response::PutBlockStatus::Errored);
    }

    #[tokio::test]
    async fn third_concurrent_session_is_refused() {
        let pool = SessionPool::new(InMemoryBlockStore::new(), SessionConfig::default());
        pool.request_session(&manifest(&["a"])).unwrap();
        pool.request_session(&manifest(&["b"])).unwrap();
        let err = pool.request_session(&manifest(&["c"])).unwrap_err();
        assert!(matches!(err, SyncError::TooManySessions));
    }

    #[tokio::test]
    async fn expired_session_is_reaped_on_next_request() {
        let config = SessionConfig {
            deadline: Duration::from_millis(1),
            ..SessionConfig::default()
        };
        let pool = SessionPool::new(InMemoryBlockStore::new(), config);
        pool.request_session(&manifest(&["a"])).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        pool.request_session(&manifest(&["b"])).unwrap();
        pool.request_session(&manifest(&["c"])).unwrap();
    }
}
