use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anilist_compare::{
    api::{create_router, AppState},
    models::{MediaEntry, MediaKind, MediaTitles},
    services::{
        providers::{ListPage, ListProvider, PageQuery, UpstreamError},
        BackoffSettings, ComparisonService, FetchSettings, ListFetcher, RateGovernor,
    },
};
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

/// Catalog served from memory; unknown users are reported as not found
#[derive(Default)]
pub struct InMemoryCatalog {
    lists: HashMap<String, Vec<MediaEntry>>,
    private: Vec<String>,
    calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: &str, titles: &[(i64, Option<&str>, Option<&str>, Option<&str>)]) -> Self {
        let entries = titles
            .iter()
            .map(|(id, romaji, english, native)| MediaEntry {
                id: *id,
                titles: MediaTitles {
                    romaji: romaji.map(str::to_string),
                    english: english.map(str::to_string),
                    native: native.map(str::to_string),
                },
                status: Default::default(),
                kind: MediaKind::Anime,
                site_url: Some(format!("https://anilist.co/anime/{}", id)),
            })
            .collect();
        self.lists.insert(username.to_lowercase(), entries);
        self
    }

    pub fn with_private_user(mut self, username: &str) -> Self {
        self.private.push(username.to_lowercase());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ListProvider for InMemoryCatalog {
    async fn fetch_page(&self, query: &PageQuery) -> Result<ListPage, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = query.username.to_lowercase();

        if self.private.contains(&key) {
            return Err(UpstreamError::PrivateList);
        }

        let entries = self.lists.get(&key).ok_or(UpstreamError::UserNotFound)?;
        let per_page = query.per_page as usize;
        let start = (query.page as usize - 1) * per_page;
        let page: Vec<MediaEntry> = entries
            .iter()
            .skip(start)
            .take(per_page)
            .map(|entry| MediaEntry {
                status: query.status,
                kind: query.kind,
                ..entry.clone()
            })
            .collect();

        Ok(ListPage {
            has_next_page: start + page.len() < entries.len(),
            entries: page,
        })
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// Anime ids 1..=4 shared between two users as in the README examples
pub fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_user(
            "Alice",
            &[
                (1, Some("Cowboy Bebop"), Some("Cowboy Bebop"), Some("カウボーイビバップ")),
                (2, Some("Shingeki no Kyojin"), Some("Attack on Titan"), Some("進撃の巨人")),
                (3, Some("Sousou no Frieren"), None, Some("葬送のフリーレン")),
            ],
        )
        .with_user(
            "Bob",
            &[
                (2, Some("Shingeki no Kyojin"), Some("Attack on Titan"), Some("進撃の巨人")),
                (3, Some("Sousou no Frieren"), None, Some("葬送のフリーレン")),
                (4, Some("Mushishi"), Some("Mushi-Shi"), Some("蟲師")),
            ],
        )
}

pub fn create_test_app(catalog: Arc<InMemoryCatalog>) -> Router {
    let governor = Arc::new(RateGovernor::new(
        4,
        BackoffSettings {
            base: Duration::from_millis(1),
            max: Duration::from_millis(10),
        },
    ));
    let settings = FetchSettings {
        page_size: 2,
        max_pages: 50,
        max_retries: 3,
        fetch_timeout: Duration::from_secs(5),
    };
    let fetcher = ListFetcher::new(catalog, governor, settings);
    let service = ComparisonService::new(fetcher, 10, Duration::from_secs(5));
    create_router(AppState::new(service))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> TestResponse {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
