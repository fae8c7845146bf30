//! Sender-side scheduling (§4.I "Sender scheduling"): drives a diff manifest
//! through a transport with a bounded outstanding window, requeueing `Retry`
//! responses to the tail and aborting the whole session on `Errored`.

use crate::error::SyncError;
use crate::response::PutBlockStatus;
use crate::session::SessionConfig;
use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use qri_collab::BlockStore;
use qri_manifest::Manifest;
use std::collections::VecDeque;
use std::time::Duration;

/// The wire the sender speaks through, abstracted so the engine itself stays
/// transport-agnostic (§4.I "Transport"). [`crate::HttpTransport`] is the
/// bundled implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request_session(&self, manifest: &Manifest) -> Result<(String, Manifest), SyncError>;
    async fn put_block(&self, sid: &str, id: &str, data: &[u8]) -> Result<crate::response::PutBlockResponse, SyncError>;
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(100 * 2u64.pow(attempt.min(6)))
}

/// Drives one full sync of `manifest` against `transport`, reading block
/// bytes for each outstanding id from the local `blocks` store (§4.I).
pub struct Sender<'a, B> {
    transport: &'a dyn Transport,
    blocks: &'a B,
    config: SessionConfig,
}

impl<'a, B: BlockStore> Sender<'a, B> {
    pub fn new(transport: &'a dyn Transport, blocks: &'a B, config: SessionConfig) -> Sender<'a, B> {
        Sender {
            transport,
            blocks,
            config,
        }
    }

    /// `Do()`: returns success only if every missing block reaches `Ok`
    /// (§4.I "Sender scheduling").
    pub async fn do_sync(&self, manifest: &Manifest) -> Result<(), SyncError> {
        let (sid, diff) = self.transport.request_session(manifest).await?;
        if diff.nodes.is_empty() {
            tracing::info!(%sid, "nothing missing; session already complete");
            return Ok(());
        }

        let mut queue: VecDeque<(String, u32)> =
            diff.nodes.iter().cloned().map(|id| (id, 0u32)).collect();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.config.outstanding_window {
                let Some((id, attempt)) = queue.pop_front() else {
                    break;
                };
                let task_sid = sid.clone();
                in_flight.push(async move {
                    let data = self.blocks.get(&id)?;
                    let response = self.transport.put_block(&task_sid, &id, &data).await?;
                    Ok::<_, SyncError>((id, attempt, response))
                });
            }

            if in_flight.is_empty() {
                break;
            }

            match in_flight.next().await {
                Some(Ok((id, attempt, response))) => match response.status {
                    PutBlockStatus::Ok => {
                        tracing::debug!(%sid, %id, "block acknowledged");
                    }
                    PutBlockStatus::Retry => {
                        if attempt + 1 >= self.config.max_retries {
                            return Err(SyncError::RetryBudgetExhausted {
                                id,
                                reason: response.err.unwrap_or_default(),
                            });
                        }
                        tracing::debug!(%sid, %id, attempt, "retrying block after backoff");
                        tokio::time::sleep(backoff(attempt)).await;
                        queue.push_back((id, attempt + 1));
                    }
                    PutBlockStatus::Errored => {
                        tracing::warn!(%sid, %id, reason = ?response.err, "receiver aborted session");
                        return Err(SyncError::Aborted {
                            id,
                            reason: response.err.unwrap_or_default(),
                        });
                    }
                },
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }

        tracing::info!(%sid, "sync session completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::SessionPool;
    use crate::response::PutBlockResponse;
    use qri_collab::fakes::InMemoryBlockStore;
    use std::sync::Mutex;

    /// Routes straight into an in-process [`SessionPool`], skipping HTTP —
    /// exercises the scheduling logic without a network round trip.
    struct InProcessTransport<'a, B> {
        pool: &'a SessionPool<B>,
    }

    #[async_trait]
    impl<'a, B: BlockStore + Send + Sync + 'static> Transport for InProcessTransport<'a, B> {
        async fn request_session(&self, manifest: &Manifest) -> Result<(String, Manifest), SyncError> {
            self.pool.request_session(manifest)
        }

        async fn put_block(&self, sid: &str, id: &str, data: &[u8]) -> Result<PutBlockResponse, SyncError> {
            Ok(self.pool.put_block(sid, id, data))
        }
    }

    fn manifest(nodes: &[&str]) -> Manifest {
        Manifest {
            links: Vec::new(),
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn do_sync_delivers_every_missing_block() {
        let mut sender_blocks = InMemoryBlockStore::new();
        sender_blocks.put("a", b"alpha").unwrap();
        sender_blocks.put("b", b"beta").unwrap();

        let pool = SessionPool::new(InMemoryBlockStore::new(), SessionConfig::default());
        let transport = InProcessTransport { pool: &pool };
        let sender = Sender::new(&transport, &sender_blocks, SessionConfig::default());

        sender.do_sync(&manifest(&["a", "b"])).await.unwrap();
        assert_eq!(pool.session_count(), 0);
    }

    #[tokio::test]
    async fn do_sync_is_a_noop_when_nothing_is_missing() {
        let sender_blocks = InMemoryBlockStore::new();
        let mut receiver_blocks = InMemoryBlockStore::new();
        receiver_blocks.put("a", b"alpha").unwrap();

        let pool = SessionPool::new(receiver_blocks, SessionConfig::default());
        let transport = InProcessTransport { pool: &pool };
        let sender = Sender::new(&transport, &sender_blocks, SessionConfig::default());

        sender.do_sync(&manifest(&["a"])).await.unwrap();
    }

    struct FlakyTransport<'a, B> {
        pool: &'a SessionPool<B>,
        failures_left: Mutex<u32>,
    }

    #[async_trait]
    impl<'a, B: BlockStore + Send + Sync + 'static> Transport for FlakyTransport<'a, B> {
        async fn request_session(&self, manifest: &Manifest) -> Result<(String, Manifest), SyncError> {
            self.pool.request_session(manifest)
        }

        async fn put_block(&self, sid: &str, id: &str, data: &[u8]) -> Result<PutBlockResponse, SyncError> {
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Ok(PutBlockResponse::retry(id, "store temporarily full"));
            }
            Ok(self.pool.put_block(sid, id, data))
        }
    }

    #[tokio::test]
    async fn retry_responses_are_requeued_and_eventually_succeed() {
        let mut sender_blocks = InMemoryBlockStore::new();
        sender_blocks.put("a", b"alpha").unwrap();

        let pool = SessionPool::new(InMemoryBlockStore::new(), SessionConfig::default());
        let transport = FlakyTransport {
            pool: &pool,
            failures_left: Mutex::new(2),
        };
        let sender = Sender::new(&transport, &sender_blocks, SessionConfig::default());

        sender.do_sync(&manifest(&["a"])).await.unwrap();
        assert_eq!(pool.session_count(), 0);
    }
}
