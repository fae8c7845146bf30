//! Sync Engine (§4.I): a session-oriented, receiver-driven block transfer
//! protocol, with a bundled HTTP transport.

mod error;
mod http;
mod pool;
mod response;
mod sender;
mod session;

pub use error::SyncError;
pub use http::{router, HttpTransport};
pub use pool::SessionPool;
pub use response::{PutBlockResponse, PutBlockStatus};
pub use sender::{Sender, Transport};
pub use session::{Session, SessionConfig, SessionState};
