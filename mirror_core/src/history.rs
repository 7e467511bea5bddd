//! Full occupancy history, answering the date queries the backend serves.
//!
//! Used by the offline snapshot data source; the live backend answers the
//! same questions over HTTP.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use segment_schema::{Position, SegmentToM1Pos};

use crate::mirror_data::PositionMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccupancyHistory {
    /// Sorted by date; records sharing a date keep their insertion order.
    records: Vec<SegmentToM1Pos>,
}

impl OccupancyHistory {
    pub fn new(records: impl IntoIterator<Item = SegmentToM1Pos>) -> Self {
        let mut records: Vec<SegmentToM1Pos> = records.into_iter().collect();
        records.sort_by_key(|record| record.date);
        Self { records }
    }

    pub fn records(&self) -> &[SegmentToM1Pos] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: SegmentToM1Pos) {
        let at = self.records.partition_point(|existing| existing.date <= record.date);
        self.records.insert(at, record);
    }

    /// Latest record per position dated on or before `date`.
    pub fn as_of(&self, date: NaiveDate) -> PositionMap {
        let mut map = PositionMap::new();
        for record in self.records.iter().take_while(|record| record.date <= date) {
            map.insert(record.position, record.clone());
        }
        map
    }

    pub fn most_recent_change(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.records
            .iter()
            .rev()
            .map(|record| record.date)
            .find(|&changed| changed <= date)
    }

    pub fn next_change(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.records
            .iter()
            .map(|record| record.date)
            .find(|&changed| changed > date)
    }

    pub fn prev_change(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.records
            .iter()
            .rev()
            .map(|record| record.date)
            .find(|&changed| changed < date)
    }

    /// Records of one position, newest first.
    pub fn position_history(&self, position: Position) -> Vec<SegmentToM1Pos> {
        self.records
            .iter()
            .rev()
            .filter(|record| record.position == position)
            .cloned()
            .collect()
    }

    /// Segment ids that could be installed at `position` on `date`: ids
    /// known to the history that are not installed elsewhere on that date,
    /// plus the position's own occupant.
    pub fn available_segment_ids(&self, position: Position, date: NaiveDate) -> Vec<String> {
        let current = self.as_of(date);
        let installed_elsewhere: BTreeSet<&str> = current
            .values()
            .filter(|record| record.position != position)
            .filter_map(|record| record.maybe_id.as_deref())
            .collect();

        let known: BTreeSet<&str> = self
            .records
            .iter()
            .filter_map(|record| record.maybe_id.as_deref())
            .collect();

        known
            .into_iter()
            .filter(|id| !installed_elsewhere.contains(id))
            .map(str::to_string)
            .collect()
    }
}
