//! One-shot subcommands: render, legend, export and import.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use mirror_core::{
    export_document, legend_rows, render_legend_text, render_view, DisplayConfig, MirrorData,
    ViewMode, ViewState,
};
use segment_runtime::{ExportDocument, ExportScope};
use tracing::info;

use crate::source::DataSource;

/// Resolves the reference date (the most recent change when none is given)
/// and loads the data for it.
pub async fn load_for(
    source: &DataSource,
    date: Option<NaiveDate>,
) -> Result<(NaiveDate, MirrorData)> {
    let date = match date {
        Some(date) => date,
        None => {
            let today = Local::now().date_naive();
            source.most_recent_change(today).await?.unwrap_or(today)
        }
    };
    let data = source.load(date).await?;
    Ok((date, data))
}

pub async fn render(
    source: &DataSource,
    config: &DisplayConfig,
    out: &Path,
    date: Option<NaiveDate>,
    view_mode: ViewMode,
    show_segment_ids: bool,
    show_spares: bool,
) -> Result<()> {
    let (date, data) = load_for(source, date).await?;
    let mut view = ViewState::new(date);
    view.view_mode = view_mode;
    view.show_segment_ids = show_segment_ids;
    view.show_spares = show_spares;

    let svg = render_view(&view, &data, config);
    fs::write(out, svg).wrap_err_with(|| format!("failed to write {}", out.display()))?;
    info!(
        target: "segment_map::inspector",
        path = %out.display(),
        date = %date,
        view = view_mode.key(),
        "render.written"
    );
    Ok(())
}

pub async fn legend(
    source: &DataSource,
    config: &DisplayConfig,
    date: Option<NaiveDate>,
    view_mode: ViewMode,
) -> Result<String> {
    let (_, data) = load_for(source, date).await?;
    let rows = legend_rows(view_mode, &data.segments, config)
        .ok_or_else(|| eyre!("the {} view colors by sector and has no legend", view_mode.key()))?;
    Ok(render_legend_text(view_mode.title(), &rows))
}

pub async fn export(
    source: &DataSource,
    out: &Path,
    date: Option<NaiveDate>,
    scope: ExportScope,
) -> Result<usize> {
    let (date, data) = load_for(source, date).await?;
    let document = export_document(date, &data.positions, scope, data.most_recent_change);
    fs::write(out, document.to_json_pretty()?)
        .wrap_err_with(|| format!("failed to write {}", out.display()))?;
    Ok(document.segments.len())
}

pub async fn import(source: &DataSource, file: &Path) -> Result<usize> {
    let contents = fs::read_to_string(file)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    let validated = ExportDocument::parse_str(&contents)?;
    let count = validated.segments.len();
    source.set_positions(&validated.into_positions()).await?;
    info!(
        target: "segment_map::inspector",
        path = %file.display(),
        count,
        "import.applied"
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotFile, SnapshotSource};
    use segment_runtime::{Position, SegmentToM1Pos};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn offline() -> DataSource {
        let pos = |text: &str| -> Position { text.parse().unwrap() };
        DataSource::Snapshot(SnapshotSource::new(SnapshotFile {
            history: vec![
                SegmentToM1Pos::installed(pos("A1"), "SN001", date(2023, 5, 1)),
                SegmentToM1Pos::installed(pos("B1"), "SN002", date(2023, 6, 1)),
            ],
            ..SnapshotFile::default()
        }))
    }

    #[tokio::test]
    async fn missing_date_uses_the_most_recent_change() {
        let (date_used, data) = load_for(&offline(), None).await.unwrap();
        assert_eq!(date_used, date(2023, 6, 1));
        assert_eq!(data.positions.len(), 2);

        let (date_used, data) = load_for(&offline(), Some(date(2023, 5, 15))).await.unwrap();
        assert_eq!(date_used, date(2023, 5, 15));
        assert_eq!(data.positions.len(), 1);
    }

    #[tokio::test]
    async fn sector_views_have_no_legend() {
        let config = DisplayConfig::default();
        assert!(legend(&offline(), &config, None, ViewMode::Installed).await.is_err());
        let text = legend(&offline(), &config, None, ViewMode::Status).await.unwrap();
        assert!(text.starts_with("Status\n"));
    }

    #[tokio::test]
    async fn snapshot_import_is_refused() {
        let path = std::env::temp_dir().join(format!("segment-import-{}.json", std::process::id()));
        fs::write(&path, r#"{"date":"2023-06-01","segments":[{"position":"A1"}]}"#).unwrap();
        let result = import(&offline(), &path).await;
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }
}
