//! In-memory catalog used by unit tests of the fetcher and the orchestrator.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::{ListStatus, MediaEntry, MediaId, MediaKind, MediaTitles};
use crate::services::providers::{ListPage, ListProvider, PageQuery, UpstreamError};

pub(crate) fn entry(id: MediaId) -> MediaEntry {
    MediaEntry {
        id,
        titles: MediaTitles {
            romaji: Some(format!("Romaji {}", id)),
            english: Some(format!("English {}", id)),
            native: Some(format!("Native {}", id)),
        },
        status: ListStatus::Planning,
        kind: MediaKind::Anime,
        site_url: Some(format!("https://anilist.co/anime/{}", id)),
    }
}

enum Account {
    List(Vec<MediaEntry>),
    Failing(UpstreamError),
}

#[derive(Default)]
pub(crate) struct FixtureCatalog {
    accounts: HashMap<String, Account>,
    delays: HashMap<String, Duration>,
    scripted: Mutex<HashMap<(String, u32), VecDeque<UpstreamError>>>,
    calls: AtomicUsize,
    calls_by_user: Mutex<HashMap<String, usize>>,
}

impl FixtureCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(mut self, username: &str, ids: &[MediaId]) -> Self {
        let entries = ids.iter().copied().map(entry).collect();
        self.accounts
            .insert(username.to_lowercase(), Account::List(entries));
        self
    }

    pub(crate) fn with_failing_user(mut self, username: &str, error: UpstreamError) -> Self {
        self.accounts
            .insert(username.to_lowercase(), Account::Failing(error));
        self
    }

    /// Every page request for this user sleeps before answering
    pub(crate) fn with_delay(mut self, username: &str, delay: Duration) -> Self {
        self.delays.insert(username.to_lowercase(), delay);
        self
    }

    /// Queues errors returned, in order, before the given page answers normally
    pub(crate) fn with_failures(self, username: &str, page: u32, errors: Vec<UpstreamError>) -> Self {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.insert((username.to_lowercase(), page), errors.into());
        }
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calls_for(&self, username: &str) -> usize {
        self.calls_by_user
            .lock()
            .map(|calls| calls.get(&username.to_lowercase()).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ListProvider for FixtureCatalog {
    async fn fetch_page(&self, query: &PageQuery) -> Result<ListPage, UpstreamError> {
        let key = query.username.to_lowercase();
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls_by_user.lock() {
            *calls.entry(key.clone()).or_insert(0) += 1;
        }

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }

        let scripted = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut scripted| scripted.get_mut(&(key.clone(), query.page))?.pop_front());
        if let Some(error) = scripted {
            return Err(error);
        }

        match self.accounts.get(&key) {
            None => Err(UpstreamError::UserNotFound),
            Some(Account::Failing(error)) => Err(error.clone()),
            Some(Account::List(entries)) => {
                let per_page = query.per_page.max(1) as usize;
                let start = (query.page.saturating_sub(1) as usize) * per_page;
                let page: Vec<MediaEntry> = entries
                    .iter()
                    .skip(start)
                    .take(per_page)
                    .map(|e| MediaEntry {
                        status: query.status,
                        kind: query.kind,
                        ..e.clone()
                    })
                    .collect();
                Ok(ListPage {
                    has_next_page: start + page.len() < entries.len(),
                    entries: page,
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
