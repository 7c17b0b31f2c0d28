/// AniList GraphQL provider
///
/// Lists are read anonymously through the public `Page.mediaList` query, one page per
/// request. AniList signals throttling with HTTP 429 and a `Retry-After` header, and
/// reports unknown or private users as GraphQL errors alongside a null page.
use reqwest::{header::RETRY_AFTER, Client as HttpClient, Response, StatusCode};
use std::time::Duration;

use crate::{
    models::anilist::{GraphQlError, GraphQlRequest, GraphQlResponse, ListQueryVariables, PageData},
    services::providers::{ListPage, ListProvider, PageQuery, UpstreamError},
};

const LIST_QUERY: &str = r#"
query ($userName: String, $status: MediaListStatus, $type: MediaType, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo {
            currentPage
            hasNextPage
        }
        mediaList(userName: $userName, status: $status, type: $type, sort: [MEDIA_ID]) {
            status
            media {
                id
                type
                siteUrl
                title {
                    romaji
                    english
                    native
                }
            }
        }
    }
}
"#;

#[derive(Clone)]
pub struct AniListProvider {
    http_client: HttpClient,
    api_url: String,
}

impl AniListProvider {
    pub fn new(api_url: String, request_timeout: Duration) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http_client,
            api_url,
        })
    }

    /// Maps the GraphQL error list of a response onto an upstream error
    fn classify_errors(errors: &[GraphQlError]) -> UpstreamError {
        for error in errors {
            let message = error.message.to_lowercase();
            if message.contains("not found") {
                return UpstreamError::UserNotFound;
            }
            if message.contains("private") {
                return UpstreamError::PrivateList;
            }
            if error.status == Some(429) || message.contains("too many requests") {
                return UpstreamError::Throttled { retry_after: None };
            }
        }

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        let message = messages.join("; ");
        if errors.iter().any(|e| e.status.is_some_and(|s| s >= 500)) {
            UpstreamError::Unavailable(message)
        } else {
            UpstreamError::Rejected(message)
        }
    }

    fn retry_after(response: &Response) -> Option<Duration> {
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    fn transport_error(err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Unavailable(err.to_string())
        }
    }

    /// Validates a decoded response body and converts it into a typed page
    fn parse_page(
        body: GraphQlResponse<PageData>,
        query: &PageQuery,
    ) -> Result<ListPage, UpstreamError> {
        if !body.errors.is_empty() {
            return Err(Self::classify_errors(&body.errors));
        }

        let page = body
            .data
            .and_then(|data| data.page)
            .ok_or_else(|| UpstreamError::Malformed("response has no Page".to_string()))?;

        let entries = page
            .media_list
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| raw.into_entry(query.status, query.kind))
            .collect();

        Ok(ListPage {
            entries,
            has_next_page: page.page_info.has_next_page.unwrap_or(false),
        })
    }
}

#[async_trait::async_trait]
impl ListProvider for AniListProvider {
    async fn fetch_page(&self, query: &PageQuery) -> Result<ListPage, UpstreamError> {
        let request = GraphQlRequest {
            query: LIST_QUERY,
            variables: ListQueryVariables {
                user_name: &query.username,
                status: query.status.as_upstream(),
                kind: query.kind.as_upstream(),
                page: query.page,
                per_page: query.per_page,
            },
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::Throttled {
                retry_after: Self::retry_after(&response),
            });
        }

        if status.is_server_error() {
            return Err(UpstreamError::Unavailable(format!(
                "AniList returned status {}",
                status
            )));
        }

        let text = response.text().await.map_err(Self::transport_error)?;

        let body: GraphQlResponse<PageData> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                status = %status,
                "Failed to deserialize AniList response"
            );
            if status.is_success() {
                UpstreamError::Malformed(e.to_string())
            } else {
                UpstreamError::Rejected(format!("AniList returned status {}", status))
            }
        })?;

        let page = Self::parse_page(body, query)?;

        tracing::debug!(
            username = %query.username,
            page = query.page,
            entries = page.entries.len(),
            has_next_page = page.has_next_page,
            provider = "anilist",
            "List page fetched"
        );

        Ok(page)
    }

    fn name(&self) -> &'static str {
        "anilist"
    }
}
