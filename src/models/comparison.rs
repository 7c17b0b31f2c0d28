use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::{collections::BTreeSet, collections::HashSet, str::FromStr};

use super::{ListStatus, MediaKind};
use crate::error::{AppError, AppResult};

/// A title field that can be omitted from the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleColumn {
    Romaji,
    English,
    Native,
}

impl TitleColumn {
    /// Output order of the columns
    pub const ALL: [TitleColumn; 3] = [TitleColumn::Romaji, TitleColumn::English, TitleColumn::Native];

    pub fn key(&self) -> &'static str {
        match self {
            TitleColumn::Romaji => "romaji",
            TitleColumn::English => "english",
            TitleColumn::Native => "native",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TitleColumn::Romaji => "Romaji",
            TitleColumn::English => "English",
            TitleColumn::Native => "Japanese",
        }
    }
}

impl FromStr for TitleColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "romaji" => Ok(TitleColumn::Romaji),
            "english" => Ok(TitleColumn::English),
            "native" => Ok(TitleColumn::Native),
            _ => Err(format!(
                "Column '{}' cannot be excluded. Choose from: romaji, english, native",
                s
            )),
        }
    }
}

/// A validated-on-demand request to compare several users' lists
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRequest {
    pub usernames: Vec<String>,
    pub status: ListStatus,
    pub kind: MediaKind,
    pub excluded: BTreeSet<TitleColumn>,
}

impl ComparisonRequest {
    pub fn new(usernames: Vec<String>) -> Self {
        Self {
            usernames,
            status: ListStatus::default(),
            kind: MediaKind::default(),
            excluded: BTreeSet::new(),
        }
    }

    pub fn with_status(mut self, status: ListStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn excluding(mut self, columns: impl IntoIterator<Item = TitleColumn>) -> Self {
        self.excluded.extend(columns);
        self
    }

    /// Checks the username set: at least two, none blank, no case-insensitive duplicates
    pub fn validate(&self, max_users: usize) -> AppResult<()> {
        if self.usernames.len() < 2 {
            return Err(AppError::Validation(
                "At least two usernames are required for a comparison".to_string(),
            ));
        }

        if self.usernames.len() > max_users {
            return Err(AppError::Validation(format!(
                "At most {} usernames can be compared at once",
                max_users
            )));
        }

        let mut seen = HashSet::new();
        for username in &self.usernames {
            if username.trim().is_empty() {
                return Err(AppError::Validation(
                    "Usernames cannot be empty".to_string(),
                ));
            }
            if !seen.insert(username.to_lowercase()) {
                return Err(AppError::Validation(format!(
                    "Username '{}' was given more than once",
                    username
                )));
            }
        }

        Ok(())
    }

    /// Columns that survive the exclusion mask, in output order
    pub fn included_columns(&self) -> Vec<TitleColumn> {
        included_columns(&self.excluded)
    }
}

pub fn included_columns(excluded: &BTreeSet<TitleColumn>) -> Vec<TitleColumn> {
    TitleColumn::ALL
        .into_iter()
        .filter(|column| !excluded.contains(column))
        .collect()
}

/// One output row: the included title columns, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(TitleColumn, Option<String>)>,
}

impl Row {
    pub fn new(cells: Vec<(TitleColumn, Option<String>)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: TitleColumn) -> Option<&Option<String>> {
        self.cells
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = TitleColumn> + '_ {
        self.cells.iter().map(|(column, _)| *column)
    }

    pub fn cells(&self) -> &[(TitleColumn, Option<String>)] {
        &self.cells
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column.key(), value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonResult {
    pub rows: Vec<Row>,
}

impl ComparisonResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
