use std::collections::BTreeSet;

use crate::models::{comparison::included_columns, ComparisonResult, MediaEntry, Row, TitleColumn};

/// Converts intersection entries into rows holding only the included title columns
pub fn project(entries: &[MediaEntry], excluded: &BTreeSet<TitleColumn>) -> ComparisonResult {
    let columns = included_columns(excluded);

    let rows = entries
        .iter()
        .map(|entry| {
            Row::new(
                columns
                    .iter()
                    .map(|column| (*column, title_for(entry, *column)))
                    .collect(),
            )
        })
        .collect();

    ComparisonResult { rows }
}

fn title_for(entry: &MediaEntry, column: TitleColumn) -> Option<String> {
    match column {
        TitleColumn::Romaji => entry.titles.romaji.clone(),
        TitleColumn::English => entry.titles.english.clone(),
        TitleColumn::Native => entry.titles.native.clone(),
    }
}
