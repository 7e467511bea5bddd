//! SVG and plain-text rendering of the mirror and its legend.

use segment_schema::{Position, SegmentToM1Pos};

use crate::aggregation::{fill_color, is_recently_changed, LegendRow};
use crate::config::DisplayConfig;
use crate::layout::{hexagon_vertices, PlacedSegment};
use crate::mirror_data::MirrorData;
use crate::view_state::ViewState;

/// Date format used in tooltips, e.g. `Mon May 01 2023`.
const TOOLTIP_DATE_FORMAT: &str = "%a %b %d %Y";

/// Width of the category column in the text legend.
const LEGEND_LABEL_WIDTH: usize = 20;

/// Characters of a segment id hidden in labels (the shared `SN-` style prefix).
const SEGMENT_ID_PREFIX_LEN: usize = 3;

pub fn render_mirror_svg(
    layout: &[PlacedSegment],
    view: &ViewState,
    data: &MirrorData,
    config: &DisplayConfig,
) -> String {
    let size = config.geometry.diameter;
    let radius = config.geometry.segment_radius;
    let outline = polygon_points(radius);
    let marker = polygon_points(radius - 1.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<rect width="{size}" height="{size}" fill="{}"/>"#,
        xml_escape(&config.background_color)
    ));
    svg.push('\n');
    for segment in layout {
        svg.push_str(&segment_group(segment, view, data, config, &outline, &marker));
    }
    svg.push_str("</svg>\n");

    tracing::debug!(
        target: "segment_map::render",
        segments = layout.len(),
        view = view.view_mode.key(),
        "render.svg_built"
    );
    svg
}

fn segment_group(
    segment: &PlacedSegment,
    view: &ViewState,
    data: &MirrorData,
    config: &DisplayConfig,
    outline: &str,
    marker: &str,
) -> String {
    let position = segment.position;
    let record = data.positions.get(&position);
    let fill = fill_color(
        position,
        &data.positions,
        &data.segments,
        view.view_mode,
        config,
    );
    let recent = data
        .most_recent_change
        .is_some_and(|since| is_recently_changed(position, &data.positions, since));
    let label = segment_label(position, record, view.show_segment_ids);
    let label_x = if position.to_string().len() == 2 { -4 } else { -6 };
    let font_size = if view.show_segment_ids { 6 } else { 7 };

    let mut group = format!(
        "<g id=\"{position}\" class=\"segment\" fill=\"{}\" transform=\"translate({:.2}, {:.2})\">\n",
        xml_escape(fill),
        segment.x,
        segment.y
    );
    group.push_str(&format!(
        "  <title>{}</title>\n",
        xml_escape(&segment_tooltip(position, record))
    ));
    group.push_str(&format!(
        "  <polygon stroke=\"white\" stroke-width=\"1.0\" points=\"{outline}\"/>\n"
    ));
    if recent {
        group.push_str(&format!(
            "  <polygon stroke=\"black\" stroke-width=\"1.0\" points=\"{marker}\"/>\n"
        ));
    }
    group.push_str(&format!(
        "  <text x=\"{label_x}\" y=\"2\" font-size=\"{font_size}\" fill=\"black\">{}</text>\n",
        xml_escape(&label)
    ));
    group.push_str("</g>\n");
    group
}

fn polygon_points(radius: f64) -> String {
    hexagon_vertices(radius)
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hover text for a position.
pub fn segment_tooltip(position: Position, record: Option<&SegmentToM1Pos>) -> String {
    let date = record
        .map(|record| record.date.format(TOOLTIP_DATE_FORMAT).to_string())
        .unwrap_or_default();
    match record.and_then(|record| record.maybe_id.as_deref()) {
        Some(id) => format!("Pos: {position}, Segment ID: {id}, Installed: {date}"),
        None => format!("Pos: {position}: Empty since: {date}"),
    }
}

/// Position label, or the occupant's id without its prefix when ids are shown.
pub fn segment_label(
    position: Position,
    record: Option<&SegmentToM1Pos>,
    show_ids: bool,
) -> String {
    if !show_ids {
        return position.to_string();
    }
    record
        .and_then(|record| record.maybe_id.as_deref())
        .map(|id| id.chars().skip(SEGMENT_ID_PREFIX_LEN).collect())
        .unwrap_or_default()
}

pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Fixed-width legend table headed by `title`.
pub fn render_legend_text(title: &str, rows: &[LegendRow]) -> String {
    let mut lines = vec![
        title.to_string(),
        format!(
            "{:<width$}{:>6}{:>6}{:>6}{:>6}",
            "Category",
            "Types",
            "Prime",
            "Spare",
            "Total",
            width = LEGEND_LABEL_WIDTH
        ),
    ];
    for row in rows {
        let types = if row.is_total() {
            "-".to_string()
        } else {
            row.stats.distinct_types.to_string()
        };
        lines.push(format!(
            "{:<width$}{:>6}{:>6}{:>6}{:>6}",
            row.label,
            types,
            row.stats.prime_count,
            row.stats.spare_count,
            row.stats.total_count,
            width = LEGEND_LABEL_WIDTH
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::legend_rows;
    use crate::layout::{mirror_layout, position_location};
    use crate::mirror_data::segment_map;
    use crate::view_mode::ViewMode;
    use chrono::NaiveDate;
    use segment_schema::JiraSegmentData;

    fn pos(text: &str) -> Position {
        text.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_data() -> MirrorData {
        MirrorData::new(
            vec![
                SegmentToM1Pos::installed(pos("F1"), "SN-001", date(2023, 5, 1)),
                SegmentToM1Pos::empty(pos("F2"), date(2023, 4, 1)),
            ],
            Vec::new(),
            Some(date(2023, 5, 1)),
        )
    }

    #[test]
    fn tooltips_describe_occupancy() {
        let record = SegmentToM1Pos::installed(pos("A1"), "SN001", date(2023, 5, 1));
        assert_eq!(
            segment_tooltip(pos("A1"), Some(&record)),
            "Pos: A1, Segment ID: SN001, Installed: Mon May 01 2023"
        );
        let empty = SegmentToM1Pos::empty(pos("A1"), date(2023, 5, 1));
        assert_eq!(
            segment_tooltip(pos("A1"), Some(&empty)),
            "Pos: A1: Empty since: Mon May 01 2023"
        );
        assert_eq!(segment_tooltip(pos("A1"), None), "Pos: A1: Empty since: ");
    }

    #[test]
    fn labels_strip_the_id_prefix() {
        let record = SegmentToM1Pos::installed(pos("B12"), "SN-042", date(2023, 5, 1));
        assert_eq!(segment_label(pos("B12"), Some(&record), false), "B12");
        assert_eq!(segment_label(pos("B12"), Some(&record), true), "042");
        assert_eq!(segment_label(pos("B12"), None, true), "");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(xml_escape(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn recent_segment_group() {
        let config = DisplayConfig::default();
        let view = ViewState::new(date(2023, 5, 1));
        let placed = position_location(pos("F1"), &config.geometry);
        let group = segment_group(
            &placed,
            &view,
            &sample_data(),
            &config,
            &polygon_points(10.0),
            &polygon_points(9.0),
        );
        insta::assert_snapshot!(group, @r##"
<g id="F1" class="segment" fill="#5fc1b7" transform="translate(245.00, 197.68)">
  <title>Pos: F1, Segment ID: SN-001, Installed: Mon May 01 2023</title>
  <polygon stroke="white" stroke-width="1.0" points="10.00,0.00 5.00,8.66 -5.00,8.66 -10.00,0.00 -5.00,-8.66 5.00,-8.66"/>
  <polygon stroke="black" stroke-width="1.0" points="9.00,0.00 4.50,7.79 -4.50,7.79 -9.00,0.00 -4.50,-7.79 4.50,-7.79"/>
  <text x="-4" y="2" font-size="7" fill="black">F1</text>
</g>
"##);
    }

    #[test]
    fn svg_has_one_group_per_position() {
        let config = DisplayConfig::default();
        let mut view = ViewState::new(date(2023, 5, 1));
        let layout = mirror_layout(&config.geometry, view.show_spares);
        let svg = render_mirror_svg(&layout, &view, &sample_data(), &config);

        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"viewBox="0 0 430 430""#));
        assert_eq!(svg.matches("<g id=").count(), 492);
        assert_eq!(svg.matches("stroke=\"black\"").count(), 1);
        assert!(svg.contains("<title>Pos: F2: Empty since: Sat Apr 01 2023</title>"));
        assert!(svg.trim_end().ends_with("</svg>"));

        view.show_segment_ids = true;
        let svg = render_mirror_svg(&layout, &view, &sample_data(), &config);
        assert!(svg.contains(r#"font-size="6" fill="black">001</text>"#));
    }

    #[test]
    fn legend_table() {
        let config = DisplayConfig::default();
        let tracker = |position: &str, allocation: &str, segment_type: u32| {
            let mut data = JiraSegmentData::for_position(pos(position));
            data.original_partner_blank_allocation = allocation.to_string();
            data.segment_type = segment_type;
            data
        };
        let segments = segment_map(vec![
            tracker("A1", "US", 1),
            tracker("B1", "US", 2),
            tracker("G1", "US", 1),
            tracker("A2", "Japan", 1),
        ]);
        let rows = legend_rows(ViewMode::SegmentAllocation, &segments, &config).unwrap();
        let text = render_legend_text(ViewMode::SegmentAllocation.title(), &rows);
        insta::assert_snapshot!(text, @r"
Segment Allocation
Category             Types Prime Spare Total
Japan                    1     1     0     1
US                       2     2     1     3
China                    0     0     0     0
India                    0     0     0     0
Canada                   0     0     0     0
TMT                      0     0     0     0
Total                    -     3     1     4
");
    }
}
