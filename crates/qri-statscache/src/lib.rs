//! Size-bounded, content-keyed cache of per-dataset body statistics (§4.J).

mod cache;
mod error;
mod key;

pub use cache::{CacheConfig, StatsCache};
pub use error::CacheError;
pub use key::CacheKey;
