//! View settings shared by the renderer and the inspector, updated through a
//! pure reducer.

use chrono::{Local, NaiveDate};

use crate::view_mode::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub reference_date: NaiveDate,
    pub view_mode: ViewMode,
    pub show_segment_ids: bool,
    pub show_spares: bool,
}

impl ViewState {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            view_mode: ViewMode::default(),
            show_segment_ids: false,
            show_spares: false,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    SetReferenceDate(NaiveDate),
    SetViewMode(ViewMode),
    SetShowSegmentIds(bool),
    ToggleSegmentIds,
    SetShowSpares(bool),
    ToggleSpares,
}

impl ViewAction {
    /// Whether applying this action requires fetching data for a new date.
    pub fn needs_reload(self, state: &ViewState) -> bool {
        matches!(self, ViewAction::SetReferenceDate(date) if date != state.reference_date)
    }
}

pub fn reduce(state: &ViewState, action: ViewAction) -> ViewState {
    let mut next = *state;
    match action {
        ViewAction::SetReferenceDate(date) => next.reference_date = date,
        ViewAction::SetViewMode(mode) => next.view_mode = mode,
        ViewAction::SetShowSegmentIds(show) => next.show_segment_ids = show,
        ViewAction::ToggleSegmentIds => next.show_segment_ids = !state.show_segment_ids,
        ViewAction::SetShowSpares(show) => next.show_spares = show,
        ViewAction::ToggleSpares => next.show_spares = !state.show_spares,
    }
    next
}

impl ViewState {
    pub fn apply(&mut self, action: ViewAction) {
        *self = reduce(self, action);
    }
}
