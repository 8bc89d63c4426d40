//! Ranking of fetched records.
//!
//! Records carrying the ranked attribute come first, ordered by it in the
//! criterion's direction with ties broken by ascending id. Records missing
//! the attribute are kept and placed last, by ascending id.

use shared::{MediaRecord, RankedEntry, RankedList, RankingCriterion, SortDirection};
use std::cmp::Ordering;

/// Order records by `criterion` and number them from 1
pub fn rank(mut records: Vec<MediaRecord>, criterion: &RankingCriterion) -> Vec<RankedEntry> {
    records.sort_by(|a, b| compare(a, b, criterion));

    records
        .into_iter()
        .zip(1u32..)
        .map(|(record, rank)| RankedEntry { rank, record })
        .collect()
}

/// Rank records into the list exported for a category
pub fn rank_list(category: &str, records: Vec<MediaRecord>, criterion: RankingCriterion) -> RankedList {
    RankedList {
        category: category.to_string(),
        criterion,
        entries: rank(records, &criterion),
    }
}

fn compare(a: &MediaRecord, b: &MediaRecord, criterion: &RankingCriterion) -> Ordering {
    match (criterion.value_of(a), criterion.value_of(b)) {
        (Some(x), Some(y)) => {
            let by_value = match criterion.direction {
                SortDirection::Descending => y.cmp(&x),
                SortDirection::Ascending => x.cmp(&y),
            };
            by_value.then_with(|| a.id.cmp(&b.id))
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}
