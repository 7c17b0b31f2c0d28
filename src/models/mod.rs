use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display, str::FromStr};

pub mod anilist;
pub mod comparison;

pub use comparison::{ComparisonRequest, ComparisonResult, Row, TitleColumn};

/// Stable identifier of a media item on the catalog service
pub type MediaId = i64;

/// User-assigned category of a list entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListStatus {
    #[default]
    Planning,
    Current,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl ListStatus {
    pub const ALL: [ListStatus; 6] = [
        ListStatus::Planning,
        ListStatus::Current,
        ListStatus::Completed,
        ListStatus::Dropped,
        ListStatus::Paused,
        ListStatus::Repeating,
    ];

    /// Upper-case name used by the catalog's GraphQL enum
    pub fn as_upstream(&self) -> &'static str {
        match self {
            ListStatus::Planning => "PLANNING",
            ListStatus::Current => "CURRENT",
            ListStatus::Completed => "COMPLETED",
            ListStatus::Dropped => "DROPPED",
            ListStatus::Paused => "PAUSED",
            ListStatus::Repeating => "REPEATING",
        }
    }

    pub fn as_lowercase(&self) -> &'static str {
        match self {
            ListStatus::Planning => "planning",
            ListStatus::Current => "current",
            ListStatus::Completed => "completed",
            ListStatus::Dropped => "dropped",
            ListStatus::Paused => "paused",
            ListStatus::Repeating => "repeating",
        }
    }

    /// Capitalized name for display, e.g. "Planning"
    pub fn title_case(&self) -> &'static str {
        match self {
            ListStatus::Planning => "Planning",
            ListStatus::Current => "Current",
            ListStatus::Completed => "Completed",
            ListStatus::Dropped => "Dropped",
            ListStatus::Paused => "Paused",
            ListStatus::Repeating => "Repeating",
        }
    }
}

impl Display for ListStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_lowercase())
    }
}

impl FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ListStatus::ALL
            .into_iter()
            .find(|status| status.as_lowercase() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = ListStatus::ALL.iter().map(|s| s.as_lowercase()).collect();
                format!(
                    "Status '{}' is not valid. Choose from: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Which of a user's lists is compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    #[default]
    Anime,
    Manga,
}

impl MediaKind {
    pub fn as_upstream(&self) -> &'static str {
        match self {
            MediaKind::Anime => "ANIME",
            MediaKind::Manga => "MANGA",
        }
    }

    pub fn as_lowercase(&self) -> &'static str {
        match self {
            MediaKind::Anime => "anime",
            MediaKind::Manga => "manga",
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anime" => Ok(MediaKind::Anime),
            "manga" => Ok(MediaKind::Manga),
            _ => Err(format!(
                "Media type '{}' is not valid. Choose from: anime, manga",
                s
            )),
        }
    }
}

/// Localized titles of a media item; any of them may be missing upstream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTitles {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

/// One entry of a user's list, normalized from the catalog response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: MediaId,
    pub titles: MediaTitles,
    pub status: ListStatus,
    pub kind: MediaKind,
    pub site_url: Option<String>,
}

/// A user's list for one status, keyed by media id and remembering fetch order
#[derive(Debug, Clone, PartialEq)]
pub struct UserList {
    pub username: String,
    entries: HashMap<MediaId, MediaEntry>,
    fetch_order: Vec<MediaId>,
}

impl UserList {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            entries: HashMap::new(),
            fetch_order: Vec::new(),
        }
    }

    /// Adds an entry; returns false when the id was already present
    pub fn insert(&mut self, entry: MediaEntry) -> bool {
        if self.entries.contains_key(&entry.id) {
            return false;
        }
        self.fetch_order.push(entry.id);
        self.entries.insert(entry.id, entry);
        true
    }

    pub fn contains(&self, id: MediaId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: MediaId) -> Option<&MediaEntry> {
        self.entries.get(&id)
    }

    pub fn fetch_order(&self) -> &[MediaId] {
        &self.fetch_order
    }

    pub fn len(&self) -> usize {
        self.fetch_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetch_order.is_empty()
    }

    /// Entries in the order they were first fetched
    pub fn iter(&self) -> impl Iterator<Item = &MediaEntry> {
        self.fetch_order.iter().filter_map(|id| self.entries.get(id))
    }
}
