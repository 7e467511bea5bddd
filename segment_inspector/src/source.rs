use chrono::NaiveDate;
use mirror_core::MirrorData;
use segment_runtime::{Position, SegmentToM1Pos, SegmentToM1Positions};

use crate::backend::{BackendClient, BackendError};
use crate::snapshot::SnapshotSource;

/// Where the inspector reads mirror data from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Backend(BackendClient),
    /// Read-only history loaded from a snapshot file.
    Snapshot(SnapshotSource),
}

/// Everything the details panel shows for one position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionDetails {
    pub current: Option<SegmentToM1Pos>,
    pub history: Vec<SegmentToM1Pos>,
    pub available_ids: Vec<String>,
}

impl DataSource {
    pub fn is_read_only(&self) -> bool {
        matches!(self, DataSource::Snapshot(_))
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Backend(client) => client.base_url().to_string(),
            DataSource::Snapshot(_) => "offline snapshot".to_string(),
        }
    }

    pub async fn load(&self, date: NaiveDate) -> Result<MirrorData, BackendError> {
        match self {
            DataSource::Backend(client) => client.load(date).await,
            DataSource::Snapshot(snapshot) => Ok(snapshot.load(date)),
        }
    }

    pub async fn most_recent_change(
        &self,
        date: NaiveDate,
    ) -> Result<Option<NaiveDate>, BackendError> {
        match self {
            DataSource::Backend(client) => client.most_recent_change(date).await,
            DataSource::Snapshot(snapshot) => Ok(snapshot.history().most_recent_change(date)),
        }
    }

    pub async fn next_change(&self, date: NaiveDate) -> Result<Option<NaiveDate>, BackendError> {
        match self {
            DataSource::Backend(client) => client.next_change(date).await,
            DataSource::Snapshot(snapshot) => Ok(snapshot.history().next_change(date)),
        }
    }

    pub async fn prev_change(&self, date: NaiveDate) -> Result<Option<NaiveDate>, BackendError> {
        match self {
            DataSource::Backend(client) => client.prev_change(date).await,
            DataSource::Snapshot(snapshot) => Ok(snapshot.history().prev_change(date)),
        }
    }

    pub async fn position_details(
        &self,
        position: Position,
        date: NaiveDate,
    ) -> Result<PositionDetails, BackendError> {
        match self {
            DataSource::Backend(client) => {
                let (current, history, available_ids) = tokio::join!(
                    client.current_segment_at(position),
                    client.position_history(position),
                    client.available_segment_ids(position),
                );
                Ok(PositionDetails {
                    current: current?,
                    history: history?,
                    available_ids: available_ids?,
                })
            }
            DataSource::Snapshot(snapshot) => Ok(PositionDetails {
                current: snapshot.current_segment_at(position, date),
                history: snapshot.history().position_history(position),
                available_ids: snapshot.history().available_segment_ids(position, date),
            }),
        }
    }

    pub async fn set_position(&self, record: &SegmentToM1Pos) -> Result<(), BackendError> {
        match self {
            DataSource::Backend(client) => client.set_position(record).await,
            DataSource::Snapshot(_) => Err(BackendError::ReadOnly),
        }
    }

    pub async fn set_positions(
        &self,
        positions: &SegmentToM1Positions,
    ) -> Result<(), BackendError> {
        match self {
            DataSource::Backend(client) => client.set_positions(positions).await,
            DataSource::Snapshot(_) => Err(BackendError::ReadOnly),
        }
    }

    pub async fn sync_with_jira(&self, progress: impl FnMut(u8)) -> Result<(), BackendError> {
        match self {
            DataSource::Backend(client) => client.sync_with_jira(progress).await,
            DataSource::Snapshot(_) => Err(BackendError::ReadOnly),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotFile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn offline() -> DataSource {
        let a1: Position = "A1".parse().unwrap();
        DataSource::Snapshot(SnapshotSource::new(SnapshotFile {
            history: vec![
                SegmentToM1Pos::installed(a1, "SN001", date(2023, 5, 1)),
                SegmentToM1Pos::installed(a1, "SN009", date(2023, 7, 1)),
            ],
            ..SnapshotFile::default()
        }))
    }

    #[tokio::test]
    async fn snapshot_source_navigates_changes() {
        let source = offline();
        assert!(source.is_read_only());
        assert_eq!(source.next_change(date(2023, 5, 1)).await.unwrap(), Some(date(2023, 7, 1)));
        assert_eq!(source.prev_change(date(2023, 7, 1)).await.unwrap(), Some(date(2023, 5, 1)));
        assert_eq!(
            source.most_recent_change(date(2023, 6, 1)).await.unwrap(),
            Some(date(2023, 5, 1))
        );

        let details = source
            .position_details("A1".parse().unwrap(), date(2023, 6, 1))
            .await
            .unwrap();
        assert_eq!(details.current.and_then(|r| r.maybe_id).as_deref(), Some("SN001"));
        assert_eq!(details.history.len(), 2);
        assert_eq!(details.available_ids, vec!["SN001".to_string(), "SN009".to_string()]);
    }

    #[tokio::test]
    async fn snapshot_source_rejects_edits() {
        let source = offline();
        let record = SegmentToM1Pos::empty("A1".parse().unwrap(), date(2023, 8, 1));
        assert!(matches!(
            source.set_position(&record).await,
            Err(BackendError::ReadOnly)
        ));
    }
}
