use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::FetchError,
    models::{ListStatus, MediaKind, UserList},
    services::{
        providers::{ListPage, ListProvider, PageQuery, UpstreamError},
        rate_governor::RateGovernor,
    },
};

/// Pagination and retry parameters for one list fetch
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    pub page_size: u32,
    pub max_pages: u32,
    /// Transient failures tolerated per fetch call before it fails
    pub max_retries: u32,
    pub fetch_timeout: Duration,
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
            max_retries: config.max_retries,
            fetch_timeout: config.fetch_timeout(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Retrieves a user's complete list by walking the catalog's pages in order
///
/// Each outbound request holds a permit from the shared [`RateGovernor`]. Cancellation
/// is checked between pages and while backing off; a request that was already sent is
/// always allowed to finish.
#[derive(Clone)]
pub struct ListFetcher {
    provider: Arc<dyn ListProvider>,
    governor: Arc<RateGovernor>,
    settings: FetchSettings,
}

impl ListFetcher {
    pub fn new(
        provider: Arc<dyn ListProvider>,
        governor: Arc<RateGovernor>,
        settings: FetchSettings,
    ) -> Self {
        Self {
            provider,
            governor,
            settings,
        }
    }

    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    /// Fetches every page of `username`'s list for `status`, bounded by the fetch timeout
    #[tracing::instrument(skip(self, cancel), fields(provider = self.provider.name()))]
    pub async fn fetch(
        &self,
        username: &str,
        status: ListStatus,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<UserList, FetchError> {
        let list = tokio::time::timeout(
            self.settings.fetch_timeout,
            self.fetch_pages(username, status, kind, cancel),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                timeout_secs = self.settings.fetch_timeout.as_secs(),
                "List fetch timed out"
            );
            FetchError::Timeout
        })??;

        tracing::info!(entries = list.len(), "List fetched");

        Ok(list)
    }

    async fn fetch_pages(
        &self,
        username: &str,
        status: ListStatus,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<UserList, FetchError> {
        let mut list = UserList::new(username);
        let mut retries = 0u32;
        let mut page = 1u32;

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(page, "Fetch cancelled at page boundary");
                return Err(FetchError::Cancelled);
            }

            if page > self.settings.max_pages {
                return Err(FetchError::UpstreamUnavailable {
                    username: username.to_string(),
                    reason: format!(
                        "pagination did not finish within {} pages",
                        self.settings.max_pages
                    ),
                });
            }

            let query = PageQuery {
                username: username.to_string(),
                status,
                kind,
                page,
                per_page: self.settings.page_size,
            };

            let ListPage {
                entries,
                has_next_page,
            } = self.fetch_page_with_retry(&query, &mut retries, cancel).await?;

            if entries.is_empty() {
                break;
            }

            for entry in entries {
                if entry.status != status {
                    tracing::debug!(
                        media_id = entry.id,
                        entry_status = %entry.status,
                        "Skipping entry with unexpected status"
                    );
                    continue;
                }
                if !list.insert(entry) {
                    tracing::debug!(page, "Ignoring duplicate entry in paginated stream");
                }
            }

            if !has_next_page {
                break;
            }
            page += 1;
        }

        Ok(list)
    }

    /// Issues one page request, retrying transient failures against the shared budget
    async fn fetch_page_with_retry(
        &self,
        query: &PageQuery,
        retries: &mut u32,
        cancel: &CancellationToken,
    ) -> Result<ListPage, FetchError> {
        loop {
            let permit = tokio::select! {
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                permit = self.governor.acquire() => permit?,
            };

            let outcome = self.provider.fetch_page(query).await;
            drop(permit);

            let error = match outcome {
                Ok(page) => return Ok(page),
                Err(error) => error,
            };

            if !error.is_transient() {
                return Err(self.fatal_error(&query.username, error));
            }

            *retries += 1;
            if *retries > self.settings.max_retries {
                tracing::warn!(
                    page = query.page,
                    retries = *retries - 1,
                    error = %error,
                    "Retry budget exhausted"
                );
                return Err(self.exhausted_error(&query.username, error, *retries));
            }

            let delay = match &error {
                UpstreamError::Throttled { retry_after } => {
                    self.governor.report_throttled(*retry_after, *retries).await
                }
                _ => self.governor.backoff_delay(*retries),
            };

            tracing::info!(
                page = query.page,
                attempt = *retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying page request"
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn fatal_error(&self, username: &str, error: UpstreamError) -> FetchError {
        match error {
            UpstreamError::UserNotFound => FetchError::UserNotFound(username.to_string()),
            UpstreamError::PrivateList => FetchError::PrivateList(username.to_string()),
            other => FetchError::UpstreamUnavailable {
                username: username.to_string(),
                reason: other.to_string(),
            },
        }
    }

    fn exhausted_error(&self, username: &str, error: UpstreamError, attempts: u32) -> FetchError {
        match error {
            UpstreamError::Throttled { .. } => FetchError::RateLimited { attempts },
            UpstreamError::Timeout => FetchError::Timeout,
            other => FetchError::UpstreamUnavailable {
                username: username.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
