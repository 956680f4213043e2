//! Sort and filter state for the incident table.
//!
//! [`TableViewModel`] only holds the user's choices. Ordering is computed by
//! [`derive`], a pure function over a borrowed record slice.

use std::cmp::Ordering;

use roadwatch_types::incident::IncidentRecord;
use serde::Serialize;
use tracing::debug;

mod order;

pub use order::{FilterMode, SortDirection, SortKey, SortSpec};

/// Column header state shown next to sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Unsorted,
    Ascending,
    Descending,
}

impl SortIndicator {
    pub fn symbol(self) -> &'static str {
        match self {
            SortIndicator::Unsorted => "⇅",
            SortIndicator::Ascending => "↑",
            SortIndicator::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableViewModel {
    sort: SortSpec,
    filter: FilterMode,
}

impl TableViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same key flips the direction; a new key starts descending.
    pub fn set_sort(&mut self, key: SortKey) {
        if self.sort.key == key {
            self.sort.direction = self.sort.direction.flipped();
        } else {
            self.sort = SortSpec {
                key,
                direction: SortDirection::Descending,
            };
        }
        debug!(key = %self.sort.key, direction = ?self.sort.direction, "Incident sort changed");
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn indicator(&self, key: SortKey) -> SortIndicator {
        match (self.sort.key == key, self.sort.direction) {
            (false, _) => SortIndicator::Unsorted,
            (true, SortDirection::Ascending) => SortIndicator::Ascending,
            (true, SortDirection::Descending) => SortIndicator::Descending,
        }
    }

    /// Recomputed on every call; nothing is cached between renders.
    pub fn view<'a>(&self, records: &'a [IncidentRecord]) -> DerivedRows<'a> {
        derive(records, &self.sort, self.filter)
    }

    pub fn counts(&self, records: &[IncidentRecord]) -> IncidentCounts {
        IncidentCounts::tally(records, self.filter)
    }
}

/// Filtered, ordered view borrowing the source records.
#[derive(Debug, Clone, Default)]
pub struct DerivedRows<'a> {
    rows: Vec<&'a IncidentRecord>,
}

impl<'a> DerivedRows<'a> {
    /// Restartable: each call yields the full sequence again.
    pub fn iter(&self) -> impl Iterator<Item = &'a IncidentRecord> + Clone + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.rows.iter().map(|record| record.id.as_str()).collect()
    }

    pub fn to_owned_records(&self) -> Vec<IncidentRecord> {
        self.rows.iter().map(|record| (*record).clone()).collect()
    }
}

impl<'r, 'a> IntoIterator for &'r DerivedRows<'a> {
    type Item = &'a IncidentRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'r, &'a IncidentRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter().copied()
    }
}

/// Filters on `resolved`, then stable-sorts on `sort.key`.
///
/// Descending order negates the comparator instead of reversing the output,
/// so records with equal keys keep their input order in both directions.
pub fn derive<'a>(
    records: &'a [IncidentRecord],
    sort: &SortSpec,
    filter: FilterMode,
) -> DerivedRows<'a> {
    let mut rows: Vec<&IncidentRecord> = records.iter().filter(|r| filter.matches(r)).collect();
    rows.sort_by(|a, b| {
        let ordering = compare(sort.key, a, b);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    DerivedRows { rows }
}

fn compare(key: SortKey, a: &IncidentRecord, b: &IncidentRecord) -> Ordering {
    match key {
        SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortKey::Confidence => a.confidence.total_cmp(&b.confidence),
        _ => match (key.text(a), key.text(b)) {
            (Some(left), Some(right)) => left.cmp(right),
            _ => Ordering::Equal,
        },
    }
}

/// Figures for the "Showing X of Y" row and the active-incident banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IncidentCounts {
    pub shown: usize,
    pub total: usize,
    pub active: usize,
}

impl IncidentCounts {
    pub fn tally(records: &[IncidentRecord], filter: FilterMode) -> Self {
        Self {
            shown: records.iter().filter(|r| filter.matches(r)).count(),
            total: records.len(),
            active: records.iter().filter(|r| !r.resolved).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roadwatch_types::RoadwatchError;

    fn record(id: &str, ts: i64, confidence: f64, resolved: bool) -> IncidentRecord {
        IncidentRecord {
            id: id.into(),
            camera_id: "CAM-01".into(),
            camera_name: "Highway I-95 North".into(),
            timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
            kind: "Collision".into(),
            confidence,
            thumbnail_url: String::new(),
            resolved,
        }
    }

    fn pair() -> Vec<IncidentRecord> {
        vec![record("A", 10, 0.9, false), record("B", 20, 0.5, true)]
    }

    #[test]
    fn default_order_is_newest_first() {
        let records = pair();
        let model = TableViewModel::new();
        assert_eq!(model.sort_spec(), SortSpec::default());
        assert_eq!(model.view(&records).ids(), ["B", "A"]);
    }

    #[test]
    fn set_sort_on_current_key_flips_direction() {
        let records = pair();
        let mut model = TableViewModel::new();

        // Timestamp is already the key, so this flips to ascending.
        model.set_sort(SortKey::Timestamp);
        assert_eq!(model.view(&records).ids(), ["A", "B"]);
        assert_eq!(model.indicator(SortKey::Timestamp), SortIndicator::Ascending);

        model.set_sort(SortKey::Timestamp);
        assert_eq!(model.view(&records).ids(), ["B", "A"]);
    }

    #[test]
    fn new_key_resets_to_descending() {
        let records = pair();
        let mut model = TableViewModel::new();
        model.set_sort(SortKey::Timestamp);
        model.set_sort(SortKey::Confidence);
        assert_eq!(model.sort_spec().direction, SortDirection::Descending);
        assert_eq!(model.view(&records).ids(), ["A", "B"]);
        assert_eq!(model.indicator(SortKey::Timestamp), SortIndicator::Unsorted);
    }

    #[test]
    fn toggling_twice_round_trips() {
        for key in SortKey::ALL {
            let mut model = TableViewModel::new();
            model.set_sort(key);
            let before = model.sort_spec();
            model.set_sort(key);
            model.set_sort(key);
            assert_eq!(model.sort_spec(), before);
        }
    }

    #[test]
    fn filter_modes_select_on_resolved() {
        let records = pair();
        let mut model = TableViewModel::new();
        model.set_filter(FilterMode::Resolved);
        assert_eq!(model.view(&records).ids(), ["B"]);
        model.set_filter(FilterMode::Active);
        assert_eq!(model.view(&records).ids(), ["A"]);
        model.set_filter(FilterMode::All);
        assert_eq!(model.view(&records).len(), 2);
    }

    #[test]
    fn filtering_never_drops_or_duplicates() {
        let records: Vec<_> = (0..9)
            .map(|i| record(&format!("R{i}"), i * 7 % 5, 0.1 * i as f64, i % 3 == 0))
            .collect();
        for mode in FilterMode::ALL {
            let rows = derive(&records, &SortSpec::default(), mode);
            let expected = records.iter().filter(|r| mode.matches(r)).count();
            assert_eq!(rows.len(), expected);
            assert!(rows.iter().all(|r| mode.matches(r)));
            let mut ids = rows.ids();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), expected);
        }
        assert_eq!(
            derive(&records, &SortSpec::default(), FilterMode::All).len(),
            records.len()
        );
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let records = vec![
            record("first", 10, 0.5, false),
            record("other", 5, 0.9, false),
            record("second", 10, 0.5, false),
            record("third", 10, 0.5, false),
        ];
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let sort = SortSpec {
                key: SortKey::Timestamp,
                direction,
            };
            let ids = derive(&records, &sort, FilterMode::All).ids();
            let tied: Vec<_> = ids.into_iter().filter(|id| *id != "other").collect();
            assert_eq!(tied, ["first", "second", "third"]);
        }
    }

    #[test]
    fn text_keys_compare_lexically() {
        let mut records = pair();
        records[0].kind = "Debris".into();
        records[1].kind = "Stalled Vehicle".into();
        let sort = SortSpec {
            key: SortKey::Kind,
            direction: SortDirection::Ascending,
        };
        assert_eq!(derive(&records, &sort, FilterMode::All).ids(), ["A", "B"]);
    }

    #[test]
    fn derive_is_restartable_and_leaves_input_untouched() {
        let records = pair();
        let snapshot = records.clone();
        let rows = derive(&records, &SortSpec::default(), FilterMode::All);
        let first: Vec<_> = rows.iter().map(|r| r.id.clone()).collect();
        let second: Vec<_> = (&rows).into_iter().map(|r| r.id.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn empty_input_yields_empty_rows() {
        let rows = derive(&[], &SortSpec::default(), FilterMode::Active);
        assert!(rows.is_empty());
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        assert_eq!("confidence".parse::<SortKey>().ok(), Some(SortKey::Confidence));
        assert_eq!("type".parse::<SortKey>().ok(), Some(SortKey::Kind));
        let err = "thumbnailUrl".parse::<SortKey>().unwrap_err();
        assert!(matches!(err, RoadwatchError::UnknownSortKey(key) if key == "thumbnailUrl"));
    }

    #[test]
    fn counts_track_filter_and_active() {
        let records = pair();
        let counts = IncidentCounts::tally(&records, FilterMode::Resolved);
        assert_eq!(
            counts,
            IncidentCounts {
                shown: 1,
                total: 2,
                active: 1
            }
        );
    }
}
