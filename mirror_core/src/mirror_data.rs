//! Data shown by one render and the store that publishes it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use segment_schema::{JiraSegmentData, Position, SegmentToM1Pos};

use crate::fence::{Fenced, RequestFence, RequestId};

/// Occupancy record per position as of the reference date.
pub type PositionMap = BTreeMap<Position, SegmentToM1Pos>;

/// Tracker record per position.
pub type SegmentMap = BTreeMap<Position, JiraSegmentData>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorData {
    pub positions: PositionMap,
    pub segments: SegmentMap,
    /// Latest occupancy change on or before the reference date.
    pub most_recent_change: Option<NaiveDate>,
    pub auth_enabled: bool,
}

impl MirrorData {
    pub fn new(
        records: impl IntoIterator<Item = SegmentToM1Pos>,
        segments: impl IntoIterator<Item = JiraSegmentData>,
        most_recent_change: Option<NaiveDate>,
    ) -> Self {
        Self {
            positions: position_map(records),
            segments: segment_map(segments),
            most_recent_change,
            auth_enabled: false,
        }
    }

    pub fn with_auth_enabled(mut self, auth_enabled: bool) -> Self {
        self.auth_enabled = auth_enabled;
        self
    }

    pub fn occupant(&self, position: Position) -> Option<&str> {
        self.positions
            .get(&position)
            .and_then(|record| record.maybe_id.as_deref())
    }

    pub fn installed_count(&self) -> usize {
        self.positions
            .values()
            .filter(|record| record.is_occupied() && !record.position.is_spare())
            .count()
    }
}

/// Keys records by position; a later record for the same position wins.
pub fn position_map(records: impl IntoIterator<Item = SegmentToM1Pos>) -> PositionMap {
    records
        .into_iter()
        .map(|record| (record.position, record))
        .collect()
}

pub fn segment_map(records: impl IntoIterator<Item = JiraSegmentData>) -> SegmentMap {
    records
        .into_iter()
        .map(|data| (data.position, data))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was issued after this one; the result was dropped.
    Stale,
}

/// Holds the published mirror data and decides which load results may replace it.
#[derive(Debug, Default)]
pub struct MirrorStore {
    fence: RequestFence,
    data: MirrorData,
    loaded: Option<RequestId>,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a load; results of earlier loads become stale.
    pub fn begin_load(&mut self) -> RequestId {
        let id = self.fence.issue();
        tracing::debug!(target: "segment_map::store", request = %id, "mirror_store.load_issued");
        id
    }

    pub fn apply(&mut self, result: Fenced<MirrorData>) -> LoadOutcome {
        if !self.fence.accept(result.id) {
            tracing::debug!(
                target: "segment_map::store",
                request = %result.id,
                "mirror_store.load_discarded=stale"
            );
            return LoadOutcome::Stale;
        }
        self.data = result.value;
        self.loaded = Some(result.id);
        tracing::debug!(
            target: "segment_map::store",
            request = %result.id,
            positions = self.data.positions.len(),
            segments = self.data.segments.len(),
            "mirror_store.load_applied"
        );
        LoadOutcome::Applied
    }

    /// Settles a failed load. Published data is kept either way; returns
    /// whether the failure belongs to the latest load.
    pub fn fail(&mut self, id: RequestId) -> bool {
        if !self.fence.accept(id) {
            return false;
        }
        self.loaded = Some(id);
        tracing::debug!(target: "segment_map::store", request = %id, "mirror_store.load_failed");
        true
    }

    pub fn data(&self) -> &MirrorData {
        &self.data
    }

    /// True while a load newer than the published data is outstanding.
    pub fn is_loading(&self) -> bool {
        self.fence.latest() != self.loaded
    }
}
