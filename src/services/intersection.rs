use crate::{
    error::{AppError, AppResult},
    models::{MediaEntry, MediaId, UserList},
};

/// Entries present in every list, in the first list's fetch order
///
/// The first list is the canonical source of title data. Each later list costs one hash
/// lookup per surviving candidate, and filtering stops as soon as nothing survives.
pub fn intersect(lists: &[UserList]) -> AppResult<Vec<MediaEntry>> {
    let (first, rest) = match lists {
        [first, rest @ ..] if !rest.is_empty() => (first, rest),
        _ => {
            return Err(AppError::Validation(
                "An intersection needs at least two lists".to_string(),
            ))
        }
    };

    let mut candidates: Vec<MediaId> = first.fetch_order().to_vec();

    for list in rest {
        if candidates.is_empty() {
            break;
        }
        candidates.retain(|id| list.contains(*id));
        tracing::debug!(
            username = %list.username,
            remaining = candidates.len(),
            "Filtered intersection candidates"
        );
    }

    Ok(candidates
        .into_iter()
        .filter_map(|id| first.get(id).cloned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::fixture::entry;

    fn list(username: &str, ids: &[MediaId]) -> UserList {
        let mut list = UserList::new(username);
        for id in ids {
            list.insert(entry(*id));
        }
        list
    }

    fn ids(entries: &[MediaEntry]) -> Vec<MediaId> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_two_users_keep_first_list_order() {
        let lists = vec![list("Alice", &[1, 2, 3]), list("Bob", &[2, 3, 4])];
        assert_eq!(ids(&intersect(&lists).unwrap()), vec![2, 3]);
    }

    #[test]
    fn test_order_follows_first_list_not_others() {
        let lists = vec![list("a", &[30, 10, 20]), list("b", &[10, 20, 30])];
        assert_eq!(ids(&intersect(&lists).unwrap()), vec![30, 10, 20]);
    }

    #[test]
    fn test_three_users() {
        let lists = vec![
            list("a", &[5, 6, 7]),
            list("b", &[6, 5]),
            list("c", &[5, 8]),
        ];
        assert_eq!(ids(&intersect(&lists).unwrap()), vec![5]);
    }

    #[test]
    fn test_empty_list_yields_empty_result() {
        let lists = vec![list("a", &[1, 2]), list("b", &[]), list("c", &[1, 2])];
        assert!(intersect(&lists).unwrap().is_empty());

        let lists = vec![list("a", &[]), list("b", &[1])];
        assert!(intersect(&lists).unwrap().is_empty());
    }

    #[test]
    fn test_disjoint_lists() {
        let lists = vec![list("a", &[1, 2]), list("b", &[3, 4])];
        assert!(intersect(&lists).unwrap().is_empty());
    }

    #[test]
    fn test_titles_come_from_first_list() {
        let mut second = UserList::new("b");
        let mut renamed = entry(1);
        renamed.titles.romaji = Some("Different".to_string());
        second.insert(renamed);

        let lists = vec![list("a", &[1]), second];
        let result = intersect(&lists).unwrap();
        assert_eq!(result[0].titles.romaji.as_deref(), Some("Romaji 1"));
    }

    #[test]
    fn test_result_is_subset_of_every_list() {
        let lists = vec![
            list("a", &[1, 2, 3, 4, 5, 6, 7, 8]),
            list("b", &[2, 4, 6, 8, 10]),
            list("c", &[8, 6, 4, 1]),
        ];
        let result = intersect(&lists).unwrap();
        assert_eq!(ids(&result), vec![4, 6, 8]);
        for entry in &result {
            assert!(lists.iter().all(|l| l.contains(entry.id)));
        }
    }

    #[test]
    fn test_fewer_than_two_lists_is_rejected() {
        assert!(matches!(
            intersect(&[list("a", &[1])]),
            Err(AppError::Validation(_))
        ));
        assert!(intersect(&[]).is_err());
    }
}
