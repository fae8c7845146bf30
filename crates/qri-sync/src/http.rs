//! The bundled HTTP transport (§4.I "Transport", §6 "Sync HTTP surface"):
//! `POST` opens a session, `PUT ?sid=&hash=` delivers one block.

use crate::error::SyncError;
use crate::pool::SessionPool;
use crate::response::{PutBlockResponse, PutBlockStatus};
use crate::sender::Transport;
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Json, Router};
use qri_collab::BlockStore;
use qri_manifest::Manifest;
use std::sync::Arc;

/// `reqwest`-backed sender-side [`Transport`] speaking the bundled HTTP wire
/// format against a [`router`] endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> HttpTransport {
        HttpTransport {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request_session(&self, manifest: &Manifest) -> Result<(String, Manifest), SyncError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(manifest)
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;

        if !resp.status().is_success() {
            return Err(SyncError::Transport(format!(
                "request_session failed with status {}",
                resp.status()
            )));
        }

        let sid = resp
            .headers()
            .get("sid")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| SyncError::Transport("response missing sid header".into()))?
            .to_string();

        let diff: Manifest = resp
            .json()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Ok((sid, diff))
    }

    async fn put_block(&self, sid: &str, id: &str, data: &[u8]) -> Result<PutBlockResponse, SyncError> {
        let url = format!("{}?sid={sid}&hash={id}", self.endpoint);
        let resp = self
            .client
            .put(&url)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Ok(match status.as_u16() {
            200..=299 => PutBlockResponse::ok(id),
            400..=499 => PutBlockResponse::retry(id, body),
            _ => PutBlockResponse::errored(id, body),
        })
    }
}

#[derive(Debug, serde::Deserialize)]
struct PutBlockQuery {
    sid: String,
    hash: String,
}

async fn handle_request_session<B: BlockStore + Send + Sync + 'static>(
    State(pool): State<Arc<SessionPool<B>>>,
    Json(manifest): Json<Manifest>,
) -> axum::response::Response {
    match pool.request_session(&manifest) {
        Ok((sid, diff)) => (StatusCode::OK, [("sid", sid)], Json(diff)).into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

async fn handle_put_block<B: BlockStore + Send + Sync + 'static>(
    State(pool): State<Arc<SessionPool<B>>>,
    Query(query): Query<PutBlockQuery>,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let response = pool.put_block(&query.sid, &query.hash, &body);
    match response.status {
        PutBlockStatus::Ok => (StatusCode::OK, Json(response)).into_response(),
        PutBlockStatus::Retry => {
            (StatusCode::BAD_REQUEST, response.err.unwrap_or_default()).into_response()
        }
        PutBlockStatus::Errored => {
            (StatusCode::INTERNAL_SERVER_ERROR, response.err.unwrap_or_default()).into_response()
        }
    }
}

/// The receiver-side HTTP surface over `pool`, mounted at the root of
/// whatever path the caller nests it under (§6).
pub fn router<B: BlockStore + Send + Sync + 'static>(pool: Arc<SessionPool<B>>) -> Router {
    Router::new()
        .route("/", post(handle_request_session::<B>))
        .route("/", put(handle_put_block::<B>))
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use qri_collab::fakes::InMemoryBlockStore;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn spawn_server() -> (SocketAddr, Arc<SessionPool<InMemoryBlockStore>>) {
        let pool = Arc::new(SessionPool::new(
            InMemoryBlockStore::new(),
            SessionConfig::default(),
        ));
        let app = router(pool.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, pool)
    }

    #[tokio::test]
    async fn http_round_trip_delivers_a_block() {
        let (addr, pool) = spawn_server().await;
        let endpoint = format!("http://{addr}/");
        let transport = HttpTransport::new(endpoint);

        let manifest = Manifest {
            links: Vec::new(),
            nodes: vec!["a".to_string()],
        };

        let (sid, diff) = transport.request_session(&manifest).await.unwrap();
        assert_eq!(diff.nodes, vec!["a"]);

        let response = transport.put_block(&sid, "a", b"hello").await.unwrap();
        assert_eq!(response.status, PutBlockStatus::Ok);
        assert_eq!(pool.session_count(), 0);
    }
}
