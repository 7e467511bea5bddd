//! Selection of the positions written to an export document.

use chrono::NaiveDate;
use segment_runtime::{ExportDocument, ExportScope};
use segment_schema::Position;

use crate::mirror_data::PositionMap;

/// Prime positions in order with their occupant.
///
/// `Recent` keeps only positions with a record dated on or after
/// `most_recent_change`; without a known change date every position that has
/// a record is kept. Spare positions are never exported.
pub fn export_segments(
    positions: &PositionMap,
    scope: ExportScope,
    most_recent_change: Option<NaiveDate>,
) -> Vec<(Position, Option<String>)> {
    Position::all()
        .filter(|position| !position.is_spare())
        .filter_map(|position| {
            let record = positions.get(&position);
            match scope {
                ExportScope::All => Some((position, record.and_then(|r| r.maybe_id.clone()))),
                ExportScope::Recent => {
                    let record = record?;
                    let recent = most_recent_change.map_or(true, |since| record.date >= since);
                    recent.then(|| (position, record.maybe_id.clone()))
                }
            }
        })
        .collect()
}

pub fn export_document(
    date: NaiveDate,
    positions: &PositionMap,
    scope: ExportScope,
    most_recent_change: Option<NaiveDate>,
) -> ExportDocument {
    let segments = export_segments(positions, scope, most_recent_change);
    tracing::info!(
        target: "segment_map::export",
        date = %date,
        scope = ?scope,
        count = segments.len(),
        "export.document_built"
    );
    ExportDocument::new(date, segments)
}
