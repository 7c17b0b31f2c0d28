//! Translation of path-style and body-style requests into [`ComparisonRequest`]s.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::{
    error::{AppError, AppResult},
    models::{ComparisonRequest, ListStatus, MediaKind, TitleColumn},
};

/// Query string of the path-style endpoints
///
/// `exclude` may repeat (`?exclude=english&exclude=native`), which `axum::extract::Query`
/// cannot express, so the raw query is parsed here.
#[derive(Debug, Default, PartialEq)]
pub struct CompareQuery {
    pub status: Option<String>,
    pub kind: Option<String>,
    pub exclude: Vec<String>,
}

impl CompareQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = CompareQuery::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "status" => query.status = Some(value.into_owned()),
                "type" => query.kind = Some(value.into_owned()),
                "exclude" => query.exclude.push(value.into_owned()),
                other => tracing::debug!(param = %other, "Ignoring unknown query parameter"),
            }
        }

        query
    }
}

/// JSON body of `POST /compare`
#[derive(Debug, Deserialize)]
pub struct CompareBody {
    pub users: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Splits a wildcard path capture like `alice/bob` into usernames
pub fn usernames_from_path(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds a request from loosely-typed parts, rejecting unknown enum values
pub fn build_request(
    usernames: Vec<String>,
    status: Option<&str>,
    kind: Option<&str>,
    exclude: &[String],
) -> AppResult<ComparisonRequest> {
    let status = match status {
        Some(raw) => raw.parse::<ListStatus>().map_err(AppError::Validation)?,
        None => ListStatus::default(),
    };

    let kind = match kind {
        Some(raw) => raw.parse::<MediaKind>().map_err(AppError::Validation)?,
        None => MediaKind::default(),
    };

    let excluded = exclude
        .iter()
        .map(|raw| raw.parse::<TitleColumn>().map_err(AppError::Validation))
        .collect::<AppResult<BTreeSet<_>>>()?;

    Ok(ComparisonRequest::new(usernames)
        .with_status(status)
        .with_kind(kind)
        .excluding(excluded))
}

impl CompareQuery {
    pub fn into_request(self, usernames: Vec<String>) -> AppResult<ComparisonRequest> {
        build_request(
            usernames,
            self.status.as_deref(),
            self.kind.as_deref(),
            &self.exclude,
        )
    }
}

impl CompareBody {
    pub fn into_request(self) -> AppResult<ComparisonRequest> {
        build_request(
            self.users,
            self.status.as_deref(),
            self.kind.as_deref(),
            &self.exclude,
        )
    }
}
