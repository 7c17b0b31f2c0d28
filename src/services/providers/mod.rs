/// Catalog provider abstraction
///
/// A provider answers exactly one page request against the catalog service. Pagination,
/// retries and rate limiting live in the list fetcher; providers only translate transport
/// and schema outcomes into typed pages or classified [`UpstreamError`]s.
use std::time::Duration;

use crate::models::{ListStatus, MediaEntry, MediaKind};

pub mod anilist;

#[cfg(test)]
pub(crate) mod fixture;

pub use anilist::AniListProvider;

/// One page request for a user's list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub username: String,
    pub status: ListStatus,
    pub kind: MediaKind,
    /// 1-based page index
    pub page: u32,
    pub per_page: u32,
}

/// One page of a user's list, already validated and converted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub entries: Vec<MediaEntry>,
    pub has_next_page: bool,
}

/// Classified outcome of a failed page request
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("user not found")]
    UserNotFound,

    #[error("list is private")]
    PrivateList,

    #[error("throttled by upstream")]
    Throttled { retry_after: Option<Duration> },

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out")]
    Timeout,

    /// Response did not match the expected schema; not worth retrying
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Upstream refused the request itself, so repeating it cannot succeed
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl UpstreamError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            UpstreamError::Throttled { .. } | UpstreamError::Unavailable(_) | UpstreamError::Timeout
        )
    }
}

/// Trait for catalog services that serve paginated user lists
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ListProvider: Send + Sync {
    /// Fetch a single page of a user's list
    async fn fetch_page(&self, query: &PageQuery) -> Result<ListPage, UpstreamError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
