//! Offline data source backed by a JSON snapshot of the database.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use mirror_core::{MirrorData, OccupancyHistory};
use segment_runtime::{JiraSegmentData, Position, SegmentToM1Pos};
use serde::{Deserialize, Serialize};

use crate::backend::BackendError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotFile {
    pub history: Vec<SegmentToM1Pos>,
    pub segments: Vec<JiraSegmentData>,
    pub auth_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SnapshotSource {
    history: OccupancyHistory,
    segments: Vec<JiraSegmentData>,
    auth_enabled: bool,
}

impl SnapshotSource {
    pub fn new(file: SnapshotFile) -> Self {
        Self {
            history: OccupancyHistory::new(file.history),
            segments: file.segments,
            auth_enabled: file.auth_enabled,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, BackendError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        Ok(Self::new(file))
    }

    pub fn from_file(path: &Path) -> Result<Self, BackendError> {
        let contents = fs::read_to_string(path).map_err(|source| BackendError::SnapshotRead {
            path: path.display().to_string(),
            source,
        })?;
        let source = Self::from_json_str(&contents)?;
        tracing::info!(
            target: "segment_map::snapshot",
            path = %path.display(),
            records = source.history.len(),
            segments = source.segments.len(),
            "snapshot.loaded"
        );
        Ok(source)
    }

    pub fn history(&self) -> &OccupancyHistory {
        &self.history
    }

    pub fn load(&self, date: NaiveDate) -> MirrorData {
        MirrorData::new(
            self.history.as_of(date).into_values(),
            self.segments.iter().cloned(),
            self.history.most_recent_change(date),
        )
        .with_auth_enabled(self.auth_enabled)
    }

    pub fn current_segment_at(
        &self,
        position: Position,
        date: NaiveDate,
    ) -> Option<SegmentToM1Pos> {
        self.history.as_of(date).remove(&position)
    }
}
