//! Core crate for the segment mirror map.
//!
//! Places the 492 prime mirror positions (plus the 82 spares) on a hexagon
//! lattice, colors them for a [`ViewMode`], builds the legend statistics and
//! renders the result. Everything here is synchronous and free of I/O apart
//! from loading the display configuration.

pub mod aggregation;
pub mod config;
pub mod export;
mod fence;
pub mod history;
pub mod layout;
mod mirror_data;
pub mod render;
mod view_mode;
mod view_state;

pub use aggregation::{
    fill_color, is_recently_changed, legend_rows, legend_stats, LegendRow, LegendStats,
    TOTAL_ROW_LABEL,
};
pub use config::{
    load_display_config, DisplayConfig, DisplayConfigError, DisplayConfigMetadata,
    GeometryConfig, Palette, PaletteConfig, PaletteEntry, DISPLAY_CONFIG_ENV,
};
pub use export::{export_document, export_segments};
pub use fence::{Fenced, RequestFence, RequestId};
pub use history::OccupancyHistory;
pub use layout::{
    hexagon_vertices, mirror_layout, position_location, sector_angle, sector_positions,
    PlacedSegment, RING_SIZES,
};
pub use mirror_data::{
    position_map, segment_map, LoadOutcome, MirrorData, MirrorStore, PositionMap, SegmentMap,
};
pub use render::{render_legend_text, render_mirror_svg, segment_label, segment_tooltip};
pub use view_mode::{Category, ColorScheme, OccupancySource, ViewMode, ViewModeSpec};
pub use view_state::{reduce, ViewAction, ViewState};

/// Everything needed to draw one frame: placements for the current spare
/// toggle and the view it is drawn with.
pub fn render_view(view: &ViewState, data: &MirrorData, config: &DisplayConfig) -> String {
    let layout = mirror_layout(&config.geometry, view.show_spares);
    render_mirror_svg(&layout, view, data, config)
}
