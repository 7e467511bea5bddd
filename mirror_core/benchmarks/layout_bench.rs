use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mirror_core::{
    fill_color, legend_rows, mirror_layout, render_view, DisplayConfig, MirrorData, ViewMode,
    ViewState,
};
use segment_schema::{JiraSegmentData, Position, SegmentToM1Pos};

fn sample_data() -> MirrorData {
    let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap_or_default();
    let allocations = ["Japan", "US", "China", "India", "Canada", "TMT"];
    let records = Position::all()
        .filter(|position| position.index() % 3 != 0)
        .map(|position| SegmentToM1Pos::installed(position, format!("SN-{position}"), date));
    let segments = Position::all().map(|position| {
        let mut data = JiraSegmentData::for_position(position);
        data.original_partner_blank_allocation =
            allocations[position.index() as usize % allocations.len()].to_string();
        data
    });
    MirrorData::new(records, segments, Some(date))
}

fn bench_layout(c: &mut Criterion) {
    let config = DisplayConfig::default();
    let mut group = c.benchmark_group("layout");
    for show_spares in [false, true] {
        group.bench_with_input(
            BenchmarkId::new("mirror_layout", show_spares),
            &show_spares,
            |b, &show_spares| b.iter(|| mirror_layout(&config.geometry, show_spares)),
        );
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let config = DisplayConfig::default();
    let data = sample_data();
    let mut group = c.benchmark_group("aggregation");

    for mode in [ViewMode::Installed, ViewMode::SegmentAllocation] {
        group.bench_with_input(BenchmarkId::new("fill_color", mode.key()), &mode, |b, &mode| {
            b.iter(|| {
                Position::all()
                    .map(|position| {
                        fill_color(position, &data.positions, &data.segments, mode, &config)
                    })
                    .count()
            })
        });
    }
    group.bench_function("legend_rows", |b| {
        b.iter(|| legend_rows(ViewMode::SegmentAllocation, &data.segments, &config))
    });
    group.bench_function("render_view", |b| {
        let view = ViewState::new(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap_or_default());
        b.iter(|| render_view(&view, &data, &config))
    });

    group.finish();
}

criterion_group!(layout_benches, bench_layout, bench_aggregation);
criterion_main!(layout_benches);
