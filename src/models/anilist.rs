//! Typed schema of the AniList GraphQL responses consumed by the list fetcher.
//!
//! Responses are deserialized into these structs at the HTTP boundary and converted into
//! [`MediaEntry`] immediately; nothing untyped leaves the provider.

use serde::{Deserialize, Serialize};

use super::{ListStatus, MediaEntry, MediaKind, MediaTitles};

/// Envelope shared by every GraphQL response
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Variables sent with the paginated list query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQueryVariables<'a> {
    pub user_name: &'a str,
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: ListQueryVariables<'a>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    #[serde(rename = "Page")]
    pub page: Option<ApiPage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage {
    pub page_info: ApiPageInfo,
    #[serde(default)]
    pub media_list: Option<Vec<ApiMediaListEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPageInfo {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMediaListEntry {
    pub status: Option<ListStatus>,
    pub media: Option<ApiMedia>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMedia {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<MediaKind>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub title: Option<ApiTitle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

impl From<ApiTitle> for MediaTitles {
    fn from(title: ApiTitle) -> Self {
        MediaTitles {
            romaji: title.romaji,
            english: title.english,
            native: title.native,
        }
    }
}

impl ApiMediaListEntry {
    /// Converts into a [`MediaEntry`], filling status and kind from the query when the
    /// response omits them. Entries without media are dropped.
    pub fn into_entry(self, status: ListStatus, kind: MediaKind) -> Option<MediaEntry> {
        let media = self.media?;
        Some(MediaEntry {
            id: media.id,
            titles: media.title.unwrap_or_default().into(),
            status: self.status.unwrap_or(status),
            kind: media.kind.unwrap_or(kind),
            site_url: media.site_url,
        })
    }
}
