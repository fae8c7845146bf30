//! Deterministic DAG manifests (§4.H): given any root of a content-addressed
//! DAG, build a complete, canonically-ordered description of its nodes and
//! edges, independent of traversal order, plus a completion tracker for
//! resumable sync.

mod completion;
mod error;
mod manifest;
mod node;

pub use completion::Completion;
pub use error::ManifestError;
pub use manifest::{build_dag_info, DagInfo, Manifest};
pub use node::NodeSource;
