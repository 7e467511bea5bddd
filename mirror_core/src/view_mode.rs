//! View modes select how segments are colored and which legend is shown.

use std::fmt;

use segment_schema::JiraSegmentData;

use crate::config::{Palette, PaletteConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Installed,
    Planned,
    SegmentAllocation,
    ItemLocation,
    RiskOfLoss,
    Components,
    Status,
}

/// Where a sector-identity view reads occupancy from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancySource {
    /// Current occupancy records from the segment database.
    Database,
    /// Planned segment id on the tracker record.
    Tracker,
}

/// Tracker attribute a categorical view colors by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SegmentAllocation,
    ItemLocation,
    RiskOfLoss,
    Components,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    SectorIdentity(OccupancySource),
    Categorical(Category),
}

/// Static description of one view mode.
#[derive(Debug)]
pub struct ViewModeSpec {
    pub mode: ViewMode,
    /// Stable key used on the command line and in menus.
    pub key: &'static str,
    pub title: &'static str,
    pub scheme: ColorScheme,
}

const VIEW_MODE_SPECS: [ViewModeSpec; 7] = [
    ViewModeSpec {
        mode: ViewMode::Installed,
        key: "installed",
        title: "Installed",
        scheme: ColorScheme::SectorIdentity(OccupancySource::Database),
    },
    ViewModeSpec {
        mode: ViewMode::Planned,
        key: "planned",
        title: "Planned",
        scheme: ColorScheme::SectorIdentity(OccupancySource::Tracker),
    },
    ViewModeSpec {
        mode: ViewMode::SegmentAllocation,
        key: "segmentAllocation",
        title: "Segment Allocation",
        scheme: ColorScheme::Categorical(Category::SegmentAllocation),
    },
    ViewModeSpec {
        mode: ViewMode::ItemLocation,
        key: "itemLocation",
        title: "Item Location",
        scheme: ColorScheme::Categorical(Category::ItemLocation),
    },
    ViewModeSpec {
        mode: ViewMode::RiskOfLoss,
        key: "riskOfLoss",
        title: "Risk Of Loss",
        scheme: ColorScheme::Categorical(Category::RiskOfLoss),
    },
    ViewModeSpec {
        mode: ViewMode::Components,
        key: "components",
        title: "Components",
        scheme: ColorScheme::Categorical(Category::Components),
    },
    ViewModeSpec {
        mode: ViewMode::Status,
        key: "status",
        title: "Status",
        scheme: ColorScheme::Categorical(Category::Status),
    },
];

impl ViewMode {
    pub const ALL: [ViewMode; 7] = [
        ViewMode::Installed,
        ViewMode::Planned,
        ViewMode::SegmentAllocation,
        ViewMode::ItemLocation,
        ViewMode::RiskOfLoss,
        ViewMode::Components,
        ViewMode::Status,
    ];

    pub fn spec(self) -> &'static ViewModeSpec {
        let slot = match self {
            ViewMode::Installed => 0,
            ViewMode::Planned => 1,
            ViewMode::SegmentAllocation => 2,
            ViewMode::ItemLocation => 3,
            ViewMode::RiskOfLoss => 4,
            ViewMode::Components => 5,
            ViewMode::Status => 6,
        };
        &VIEW_MODE_SPECS[slot]
    }

    pub fn key(self) -> &'static str {
        self.spec().key
    }

    pub fn title(self) -> &'static str {
        self.spec().title
    }

    pub fn scheme(self) -> ColorScheme {
        self.spec().scheme
    }

    /// Looks a mode up by key; matching ignores ASCII case.
    pub fn from_key(key: &str) -> Option<Self> {
        VIEW_MODE_SPECS
            .iter()
            .find(|spec| spec.key.eq_ignore_ascii_case(key))
            .map(|spec| spec.mode)
    }

    pub fn category(self) -> Option<Category> {
        match self.scheme() {
            ColorScheme::Categorical(category) => Some(category),
            ColorScheme::SectorIdentity(_) => None,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

fn allocation_of(data: &JiraSegmentData) -> &str {
    &data.original_partner_blank_allocation
}

fn location_of(data: &JiraSegmentData) -> &str {
    &data.item_location
}

fn risk_of(data: &JiraSegmentData) -> &str {
    &data.risk_of_loss
}

fn components_of(data: &JiraSegmentData) -> &str {
    &data.components
}

fn status_of(data: &JiraSegmentData) -> &str {
    &data.status
}

impl Category {
    /// Accessor for the tracker attribute this category reads.
    pub fn accessor(self) -> fn(&JiraSegmentData) -> &str {
        match self {
            Category::SegmentAllocation => allocation_of,
            Category::ItemLocation => location_of,
            Category::RiskOfLoss => risk_of,
            Category::Components => components_of,
            Category::Status => status_of,
        }
    }

    pub fn value_of(self, data: &JiraSegmentData) -> &str {
        (self.accessor())(data)
    }

    pub fn palette(self, palettes: &PaletteConfig) -> &Palette {
        match self {
            Category::SegmentAllocation => &palettes.segment_allocation,
            Category::ItemLocation => &palettes.item_location,
            Category::RiskOfLoss => &palettes.risk_of_loss,
            Category::Components => &palettes.components,
            Category::Status => &palettes.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_their_modes() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.spec().mode, mode);
            assert_eq!(ViewMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(ViewMode::from_key("RISKOFLOSS"), Some(ViewMode::RiskOfLoss));
        assert_eq!(ViewMode::from_key("syncWithJira"), None);
        assert_eq!(ViewMode::default(), ViewMode::Installed);
    }

    #[test]
    fn categorical_modes_read_their_attribute() {
        let mut data = JiraSegmentData::for_position("A1".parse().unwrap());
        data.original_partner_blank_allocation = "US".to_string();
        data.item_location = "Canon".to_string();
        data.status = "Accepted".to_string();

        assert_eq!(
            ViewMode::SegmentAllocation.category().unwrap().value_of(&data),
            "US"
        );
        assert_eq!(ViewMode::ItemLocation.category().unwrap().value_of(&data), "Canon");
        assert_eq!(ViewMode::Status.category().unwrap().value_of(&data), "Accepted");
        assert_eq!(ViewMode::Installed.category(), None);
        assert_eq!(
            ViewMode::Planned.scheme(),
            ColorScheme::SectorIdentity(OccupancySource::Tracker)
        );
    }
}
