//! The receiver's response to a single `put_block` call (§4.I step 2).

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PutBlockStatus {
    Ok,
    Retry,
    Errored,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PutBlockResponse {
    pub hash: String,
    pub status: PutBlockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl PutBlockResponse {
    pub fn ok(hash: impl Into<String>) -> PutBlockResponse {
        PutBlockResponse {
            hash: hash.into(),
            status: PutBlockStatus::Ok,
            err: None,
        }
    }

    pub fn retry(hash: impl Into<String>, reason: impl Into<String>) -> PutBlockResponse {
        PutBlockResponse {
            hash: hash.into(),
            status: PutBlockStatus::Retry,
            err: Some(reason.into()),
        }
    }

    pub fn errored(hash: impl Into<String>, reason: impl Into<String>) -> PutBlockResponse {
        PutBlockResponse {
            hash: hash.into(),
            status: PutBlockStatus::Errored,
            err: Some(reason.into()),
        }
    }
}
