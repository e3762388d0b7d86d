//! Max-merge of a fresh report with the persisted table.

use crate::models::{Metric, WeekRange, WeekRow, WeekTable};
use tracing::{debug, warn};

/// Combine a freshly aggregated table with the persisted one.
///
/// Both sides are reindexed to weeks 1-53. Each count becomes the larger of
/// the two values, with null losing to any observed value; labels prefer the
/// fresh side. Weeks that neither side ever observed are dropped.
pub fn merge(fresh: &WeekTable, persisted: &WeekTable) -> WeekTable {
    let range = WeekRange::FULL;

    let discarded = persisted
        .rows
        .iter()
        .filter(|r| !range.contains(r.week))
        .count();
    if discarded > 0 {
        warn!(
            "Ignoring {} persisted rows outside weeks {}-{}",
            discarded, range.first, range.last
        );
    }

    let rows: Vec<WeekRow> = range
        .iter()
        .map(|week| {
            let new = fresh.row(week).cloned().unwrap_or_else(|| WeekRow::unobserved(week));
            let old = persisted.row(week).cloned().unwrap_or_else(|| WeekRow::unobserved(week));
            merge_row(new, old)
        })
        .filter(|row| !row.is_unobserved())
        .collect();

    debug!(
        "Merged {} fresh and {} persisted rows into {}",
        fresh.len(),
        persisted.len(),
        rows.len()
    );

    WeekTable::new(rows)
}

/// Merge two rows for the same week: per-cell max, labels from `fresh` first.
pub(crate) fn merge_row(fresh: WeekRow, persisted: WeekRow) -> WeekRow {
    // `None < Some(_)`, so Option's ordering already treats null as the identity.
    let counts = Metric::ALL.map(|metric| fresh.count(metric).max(persisted.count(metric)));

    let mut merged = WeekRow {
        week: fresh.week,
        start: fresh.start.or(persisted.start),
        end: fresh.end.or(persisted.end),
        ..WeekRow::unobserved(fresh.week)
    };
    for (metric, value) in Metric::ALL.into_iter().zip(counts) {
        merged.set_count(metric, value);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::aggregate;

    fn row(week: u32, labels: bool, counts: [Option<u32>; 3]) -> WeekRow {
        WeekRow {
            week,
            start: labels.then(|| format!("S{week}")),
            end: labels.then(|| format!("E{week}")),
            contacts_made: counts[0],
            meetings_planned: counts[1],
            meetings_performed: counts[2],
        }
    }

    #[test]
    fn test_merge_keeps_persisted_maximum() {
        let fresh = WeekTable::new(vec![row(5, true, [Some(1), Some(0), Some(0)])]);
        let persisted = WeekTable::new(vec![row(5, true, [Some(3), None, None])]);

        let merged = merge(&fresh, &persisted);
        let week5 = merged.row(5).unwrap();
        assert_eq!(week5.contacts_made, Some(3));
        assert_eq!(week5.meetings_planned, Some(0));
        assert_eq!(week5.meetings_performed, Some(0));
    }

    #[test]
    fn test_merge_null_is_identity() {
        let fresh = WeekTable::new(vec![row(2, false, [None, Some(4), None])]);
        let persisted = WeekTable::new(vec![row(2, false, [Some(1), None, None])]);

        let week2 = merge(&fresh, &persisted).row(2).cloned().unwrap();
        assert_eq!(week2.contacts_made, Some(1));
        assert_eq!(week2.meetings_planned, Some(4));
        assert_eq!(week2.meetings_performed, None);
    }

    #[test]
    fn test_merge_labels_prefer_fresh() {
        let fresh = WeekTable::new(vec![row(3, true, [Some(0); 3])]);
        let persisted = WeekTable::new(vec![
            WeekRow {
                start: Some("old".to_string()),
                end: Some("old".to_string()),
                ..row(3, false, [Some(1); 3])
            },
            WeekRow {
                start: Some("Jan-22".to_string()),
                ..row(4, false, [Some(2), None, None])
            },
        ]);

        let merged = merge(&fresh, &persisted);
        assert_eq!(merged.row(3).unwrap().start.as_deref(), Some("S3"));
        assert_eq!(merged.row(4).unwrap().start.as_deref(), Some("Jan-22"));
        assert_eq!(merged.row(4).unwrap().end, None);
    }

    #[test]
    fn test_merge_row_combines_labels_and_counts() {
        let fresh = row(8, false, [Some(1), None, Some(4)]);
        let persisted = row(8, true, [Some(3), Some(2), None]);

        let merged = merge_row(fresh, persisted);
        assert_eq!(merged.start.as_deref(), Some("S8"));
        assert_eq!(merged.end.as_deref(), Some("E8"));
        assert_eq!(merged.contacts_made, Some(3));
        assert_eq!(merged.meetings_planned, Some(2));
        assert_eq!(merged.meetings_performed, Some(4));
    }

    #[test]
    fn test_merge_drops_unobserved_weeks_only() {
        let fresh = WeekTable::new(vec![row(1, false, [Some(0), None, None])]);
        let persisted = WeekTable::new(vec![row(7, false, [None, None, Some(2)])]);

        let merged = merge(&fresh, &persisted);
        let weeks: Vec<u32> = merged.rows.iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![1, 7]);
        assert_eq!(merged.row(1).unwrap().contacts_made, Some(0));
    }

    #[test]
    fn test_merge_discards_out_of_range_rows() {
        let persisted = WeekTable::new(vec![
            row(0, true, [Some(9); 3]),
            row(54, true, [Some(9); 3]),
        ]);
        assert!(merge(&WeekTable::default(), &persisted).is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let table = WeekTable::new(vec![
            row(1, true, [Some(2), Some(0), None]),
            row(10, false, [None, Some(5), Some(1)]),
            row(53, true, [Some(0), Some(0), Some(0)]),
        ]);
        assert_eq!(merge(&table, &table), table);
    }

    #[test]
    fn test_merge_is_exact_maximum() {
        let fresh = WeekTable::new(
            (1..=53)
                .map(|w| row(w, true, [Some(w % 4), Some(w % 3), None]))
                .collect(),
        );
        let persisted = WeekTable::new(
            (1..=53)
                .filter(|w| w % 2 == 0)
                .map(|w| row(w, false, [Some(w % 5), None, Some(w % 2)]))
                .collect(),
        );

        let merged = merge(&fresh, &persisted);
        assert_eq!(merged.len(), 53);
        for merged_row in &merged.rows {
            for metric in Metric::ALL {
                let new = fresh.row(merged_row.week).and_then(|r| r.count(metric));
                let old = persisted.row(merged_row.week).and_then(|r| r.count(metric));
                assert_eq!(merged_row.count(metric), new.max(old));
            }
        }
    }

    #[test]
    fn test_merge_with_empty_persisted_table() {
        let fresh = aggregate(&[], WeekRange::FULL, 2024);
        let merged = merge(&fresh, &WeekTable::default());
        assert_eq!(merged, fresh);
    }
}
