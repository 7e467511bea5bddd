#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mirror_core::{DisplayConfig, MirrorData, OccupancyHistory};
use segment_runtime::{JiraSegmentData, Position, SegmentToM1Pos};
use serde::Deserialize;

/// Occupancy history plus tracker data, as stored in the fixture files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorFixture {
    pub history: Vec<SegmentToM1Pos>,
    pub segments: Vec<JiraSegmentData>,
    #[serde(default)]
    pub auth_enabled: bool,
}

impl MirrorFixture {
    pub fn history(&self) -> OccupancyHistory {
        OccupancyHistory::new(self.history.iter().cloned())
    }

    /// Data a client would receive when loading `date`.
    pub fn data_on(&self, date: NaiveDate) -> MirrorData {
        let history = self.history();
        MirrorData::new(
            history.as_of(date).into_values(),
            self.segments.iter().cloned(),
            history.most_recent_change(date),
        )
        .with_auth_enabled(self.auth_enabled)
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Result<MirrorFixture> {
    let path = fixture_path(name);
    let contents =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

pub fn mirror_history() -> MirrorFixture {
    load_fixture("mirror_history.json").expect("mirror history fixture")
}

pub fn config() -> Arc<DisplayConfig> {
    DisplayConfig::builtin()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn pos(text: &str) -> Position {
    text.parse().expect("valid position")
}
