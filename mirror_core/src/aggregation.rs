//! Per-position colors, legend statistics and change markers for a view.
//!
//! Everything here is total: missing occupancy or tracker data falls back to
//! the empty sector color or the configured undefined color.

use chrono::NaiveDate;
use segment_schema::Position;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::mirror_data::{PositionMap, SegmentMap};
use crate::view_mode::{Category, ColorScheme, OccupancySource, ViewMode};

/// Label of the synthesized legend row.
pub const TOTAL_ROW_LABEL: &str = "Total";

/// Fill color of `position` in `mode`.
pub fn fill_color<'a>(
    position: Position,
    positions: &PositionMap,
    segments: &SegmentMap,
    mode: ViewMode,
    config: &'a DisplayConfig,
) -> &'a str {
    match mode.scheme() {
        ColorScheme::SectorIdentity(source) => {
            let occupied = match source {
                OccupancySource::Database => positions
                    .get(&position)
                    .is_some_and(|record| record.is_occupied()),
                OccupancySource::Tracker => segments
                    .get(&position)
                    .is_some_and(|data| data.planned_segment_id().is_some()),
            };
            config
                .sector_color(position.sector(), occupied)
                .unwrap_or(config.undefined_color.as_str())
        }
        ColorScheme::Categorical(category) => segments
            .get(&position)
            .and_then(|data| category.palette(&config.palettes).color_for(category.value_of(data)))
            .unwrap_or(config.undefined_color.as_str()),
    }
}

/// Counts of tracker records carrying one category value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LegendStats {
    /// Distinct segment types among the matching records.
    pub distinct_types: usize,
    pub prime_count: usize,
    pub spare_count: usize,
    pub total_count: usize,
}

pub fn legend_stats(category: Category, value: &str, segments: &SegmentMap) -> LegendStats {
    let mut types = Vec::new();
    let mut stats = LegendStats::default();
    for data in segments.values().filter(|data| category.value_of(data) == value) {
        if !types.contains(&data.segment_type) {
            types.push(data.segment_type);
        }
        if data.is_spare() {
            stats.spare_count += 1;
        } else {
            stats.prime_count += 1;
        }
        stats.total_count += 1;
    }
    stats.distinct_types = types.len();
    stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendRow {
    pub label: String,
    /// Swatch color; `None` for the total row.
    pub color: Option<String>,
    pub stats: LegendStats,
}

impl LegendRow {
    pub fn is_total(&self) -> bool {
        self.color.is_none()
    }
}

/// Legend for `mode` in palette order followed by a total row.
///
/// Sector-identity modes have no legend.
pub fn legend_rows(
    mode: ViewMode,
    segments: &SegmentMap,
    config: &DisplayConfig,
) -> Option<Vec<LegendRow>> {
    let category = mode.category()?;
    let palette = category.palette(&config.palettes);

    let mut rows: Vec<LegendRow> = palette
        .entries()
        .iter()
        .map(|entry| LegendRow {
            label: entry.value.clone(),
            color: Some(entry.color.clone()),
            stats: legend_stats(category, &entry.value, segments),
        })
        .collect();

    // Distinct types are per category and are not summed.
    let total = rows.iter().fold(LegendStats::default(), |acc, row| LegendStats {
        distinct_types: 0,
        prime_count: acc.prime_count + row.stats.prime_count,
        spare_count: acc.spare_count + row.stats.spare_count,
        total_count: acc.total_count + row.stats.total_count,
    });
    rows.push(LegendRow {
        label: TOTAL_ROW_LABEL.to_string(),
        color: None,
        stats: total,
    });
    Some(rows)
}

/// True when the position has a record dated on or after `reference`.
pub fn is_recently_changed(
    position: Position,
    positions: &PositionMap,
    reference: NaiveDate,
) -> bool {
    positions
        .get(&position)
        .is_some_and(|record| record.date >= reference)
}
