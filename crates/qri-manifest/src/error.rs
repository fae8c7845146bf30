#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("node {0:?} not found")]
    NodeNotFound(String),
    #[error("failed to encode manifest as CBOR: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),
    #[error("failed to decode manifest from CBOR: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),
}
