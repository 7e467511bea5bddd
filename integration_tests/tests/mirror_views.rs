mod common;

use common::{config, date, mirror_history, pos};
use mirror_core::{
    fill_color, legend_rows, mirror_layout, render_legend_text, render_view, ViewMode, ViewState,
    TOTAL_ROW_LABEL,
};

#[test]
fn installed_view_colors_by_sector_occupancy() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    let config = config();
    let color = |text: &str| {
        fill_color(pos(text), &data.positions, &data.segments, ViewMode::Installed, &config)
    };

    assert_eq!(color("A1"), "#4e9fd6");
    // removed on 2023-06-01
    assert_eq!(color("A2"), "#c3def2");
    assert_eq!(color("A3"), "#c3def2");
    // installed after the reference date
    assert_eq!(color("D82"), "#f1c7c7");
}

#[test]
fn planned_view_reads_tracker_assignments() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    let config = config();
    let color = |text: &str| {
        fill_color(pos(text), &data.positions, &data.segments, ViewMode::Planned, &config)
    };

    assert_eq!(color("A2"), "#4e9fd6");
    assert_eq!(color("C5"), "#c8e8c8");
}

#[test]
fn categorical_views_use_palettes_and_fall_back_to_undefined() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    let config = config();
    let color = |text: &str, mode| {
        fill_color(pos(text), &data.positions, &data.segments, mode, &config)
    };

    assert_eq!(color("A1", ViewMode::SegmentAllocation), "#3cb44b");
    assert_eq!(color("B1", ViewMode::SegmentAllocation), "#e6194b");
    assert_eq!(color("G1", ViewMode::Status), "#e6194b");
    assert_eq!(color("A3", ViewMode::SegmentAllocation), config.undefined_color.as_str());
}

#[test]
fn allocation_legend_counts_prime_and_spare() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    let rows = legend_rows(ViewMode::SegmentAllocation, &data.segments, &config())
        .expect("categorical view has a legend");

    let row = |label: &str| rows.iter().find(|row| row.label == label).expect("legend row");
    let us = row("US");
    assert_eq!(us.stats.distinct_types, 2);
    assert_eq!(us.stats.prime_count, 2);
    assert_eq!(us.stats.spare_count, 1);
    assert_eq!(us.stats.total_count, 3);
    assert_eq!(row("China").stats.total_count, 0);

    let total = rows.last().expect("total row");
    assert_eq!(total.label, TOTAL_ROW_LABEL);
    assert_eq!(total.stats.prime_count, 4);
    assert_eq!(total.stats.spare_count, 1);
    assert_eq!(total.stats.total_count, 5);

    let text = render_legend_text(ViewMode::SegmentAllocation.title(), &rows);
    assert!(text.starts_with("Segment Allocation\n"));
    assert_eq!(text.lines().count(), rows.len() + 2);
}

#[test]
fn sector_views_have_no_legend() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    assert!(legend_rows(ViewMode::Installed, &data.segments, &config()).is_none());
    assert!(legend_rows(ViewMode::Planned, &data.segments, &config()).is_none());
}

#[test]
fn svg_marks_positions_changed_at_the_most_recent_change() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    assert_eq!(data.most_recent_change, Some(date(2023, 6, 1)));

    let svg = render_view(&ViewState::new(date(2023, 6, 15)), &data, &config());
    let group = |id: &str| {
        let start = svg.find(&format!("<g id=\"{id}\"")).expect("segment group");
        let end = start + svg[start..].find("</g>").expect("group end");
        svg[start..end].to_string()
    };

    assert!(group("C5").contains("stroke=\"black\""));
    assert!(group("A2").contains("stroke=\"black\""));
    assert!(!group("A1").contains("stroke=\"black\""));
    assert!(group("A1").contains("Pos: A1, Segment ID: SN001, Installed: Mon May 01 2023"));
    assert!(group("A2").contains("Pos: A2: Empty since: Thu Jun 01 2023"));
    assert_eq!(
        svg.matches("class=\"segment\"").count(),
        mirror_layout(&config().geometry, false).len()
    );
    assert!(!svg.contains("id=\"G1\""));
}

#[test]
fn spare_toggle_draws_only_the_spare_sector() {
    let data = mirror_history().data_on(date(2023, 6, 15));
    let mut view = ViewState::new(date(2023, 6, 15));
    view.show_spares = true;
    view.show_segment_ids = true;

    let svg = render_view(&view, &data, &config());
    assert!(svg.contains("id=\"G1\""));
    assert!(!svg.contains("id=\"A1\""));
    // ids drop their three character prefix
    assert!(svg.contains(">500</text>"));
}
