use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult, FetchError},
    models::{ComparisonRequest, ComparisonResult, MediaEntry, UserList},
    services::{
        intersection::intersect,
        list_fetcher::{FetchSettings, ListFetcher},
        projection::project,
        providers::ListProvider,
        rate_governor::RateGovernor,
    },
};

/// Stages of a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonState {
    Idle,
    Fetching,
    Intersecting,
    Projecting,
    Done,
    Failed,
}

impl ComparisonState {
    pub fn can_transition_to(self, next: ComparisonState) -> bool {
        use ComparisonState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Idle, Failed)
                | (Fetching, Intersecting)
                | (Fetching, Failed)
                | (Intersecting, Projecting)
                | (Intersecting, Done)
                | (Projecting, Done)
        )
    }
}

impl Display for ComparisonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComparisonState::Idle => "idle",
            ComparisonState::Fetching => "fetching",
            ComparisonState::Intersecting => "intersecting",
            ComparisonState::Projecting => "projecting",
            ComparisonState::Done => "done",
            ComparisonState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Tracks the state of one comparison run for logging
struct Progress {
    state: ComparisonState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: ComparisonState::Idle,
        }
    }

    fn advance(&mut self, next: ComparisonState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal comparison transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "Comparison state change");
        self.state = next;
    }

    fn fail(&mut self, error: AppError) -> AppError {
        self.advance(ComparisonState::Failed);
        error
    }
}

/// Drives comparisons end to end: validation, concurrent fetches, intersection, projection
#[derive(Clone)]
pub struct ComparisonService {
    fetcher: ListFetcher,
    max_users: usize,
    comparison_timeout: Duration,
}

impl ComparisonService {
    pub fn new(fetcher: ListFetcher, max_users: usize, comparison_timeout: Duration) -> Self {
        Self {
            fetcher,
            max_users,
            comparison_timeout,
        }
    }

    /// Builds the service from configuration around a shared governor
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn ListProvider>,
        governor: Arc<RateGovernor>,
    ) -> Self {
        let fetcher = ListFetcher::new(provider, governor, FetchSettings::from(config));
        Self::new(fetcher, config.max_users, config.comparison_timeout())
    }

    /// Runs a full comparison and returns the projected rows
    pub async fn compare(&self, request: &ComparisonRequest) -> AppResult<ComparisonResult> {
        let mut progress = Progress::new();
        let entries = self.common_entries(request, &mut progress).await?;

        progress.advance(ComparisonState::Projecting);
        let result = project(&entries, &request.excluded);
        progress.advance(ComparisonState::Done);

        Ok(result)
    }

    /// Runs a comparison up to the intersection, keeping full entries
    pub async fn compare_entries(&self, request: &ComparisonRequest) -> AppResult<Vec<MediaEntry>> {
        let mut progress = Progress::new();
        let entries = self.common_entries(request, &mut progress).await?;
        progress.advance(ComparisonState::Done);
        Ok(entries)
    }

    async fn common_entries(
        &self,
        request: &ComparisonRequest,
        progress: &mut Progress,
    ) -> AppResult<Vec<MediaEntry>> {
        if let Err(e) = request.validate(self.max_users) {
            return Err(progress.fail(e));
        }

        let start = Instant::now();
        progress.advance(ComparisonState::Fetching);

        tracing::info!(
            users = request.usernames.len(),
            status = %request.status,
            kind = request.kind.as_lowercase(),
            "Starting comparison"
        );

        let lists = match self.fetch_all(request).await {
            Ok(lists) => lists,
            Err(e) => return Err(progress.fail(e)),
        };

        progress.advance(ComparisonState::Intersecting);
        let entries = intersect(&lists)?;

        tracing::info!(
            common = entries.len(),
            processing_time_ms = start.elapsed().as_millis() as u64,
            "Comparison completed"
        );

        Ok(entries)
    }

    /// Fetches every user's list concurrently; the first failure cancels the rest
    async fn fetch_all(&self, request: &ComparisonRequest) -> AppResult<Vec<UserList>> {
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for (index, username) in request.usernames.iter().cloned().enumerate() {
            let fetcher = self.fetcher.clone();
            let token = cancel.clone();
            let status = request.status;
            let kind = request.kind;
            tasks.spawn(
                async move {
                    let result = fetcher.fetch(&username, status, kind, &token).await;
                    (index, username, result)
                }
                .in_current_span(),
            );
        }

        let outcome = tokio::time::timeout(
            self.comparison_timeout,
            collect_lists(&mut tasks, request.usernames.len()),
        )
        .await;

        let error = match outcome {
            Ok(Ok(lists)) => return Ok(lists),
            Ok(Err(e)) => e,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.comparison_timeout.as_secs(),
                    "Comparison timed out"
                );
                AppError::Fetch(FetchError::Timeout)
            }
        };

        // siblings stop at their next page boundary; requests already sent may finish
        cancel.cancel();
        tasks.detach_all();

        Err(error)
    }
}

/// Gathers fetch results into slots ordered like the request's usernames
async fn collect_lists(
    tasks: &mut JoinSet<(usize, String, Result<UserList, FetchError>)>,
    count: usize,
) -> AppResult<Vec<UserList>> {
    let mut slots: Vec<Option<UserList>> = vec![None; count];

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(list))) => slots[index] = Some(list),
            Ok((_, username, Err(e))) => {
                tracing::warn!(username = %username, error = %e, "List fetch failed, aborting comparison");
                return Err(e.into());
            }
            Err(e) => {
                tracing::error!(error = %e, "Fetch task join error");
                return Err(AppError::Internal(e.to_string()));
            }
        }
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| AppError::Internal("A list fetch finished without a result".to_string()))
}
