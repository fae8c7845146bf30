//! Receiver-side session state (§4.I).

use qri_manifest::Manifest;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Config for the receiver's session pool. Constructed with `Default` or
/// explicit field overrides, like the rest of this workspace's engines (§10).
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub deadline: Duration,
    pub outstanding_window: usize,
    pub max_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            deadline: Duration::from_secs(5 * 60 * 60),
            outstanding_window: 16,
            max_retries: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Complete,
    Cancelled,
}

/// A single in-progress sync session on the receiver side (§4.I). `missing`
/// tracks block ids not yet received; the session is [`SessionState::Complete`]
/// once it is empty.
#[derive(Debug, Clone)]
pub struct Session {
    pub sid: String,
    pub diff: Manifest,
    pub missing: BTreeSet<String>,
    pub deadline_at: Instant,
    pub state: SessionState,
}

impl Session {
    pub fn new(sid: String, diff: Manifest, deadline: Duration) -> Session {
        let missing = diff.nodes.iter().cloned().collect();
        Session {
            sid,
            diff,
            missing,
            deadline_at: Instant::now() + deadline,
            state: SessionState::Active,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline_at
    }
}
