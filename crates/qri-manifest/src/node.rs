use crate::ManifestError;

/// Retrieves the links and size of a node by id. Implementations typically wrap
/// a block store or an in-memory test DAG; node-getter calls are the only
/// suspension point manifest construction has (§5).
pub trait NodeSource {
    /// The ids this node links to (its outgoing edges).
    fn links(&self, id: &str) -> Result<Vec<String>, ManifestError>;
    /// The byte size of this node's content.
    fn size(&self, id: &str) -> Result<u64, ManifestError>;
}
