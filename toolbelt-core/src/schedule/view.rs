use chrono::{Months, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// The three interchangeable calendar layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarView {
    Month,
    Week,
    Day,
}

/// Navigation state for the calendar screen: the anchor date plus which
/// layout is active. `previous`/`next` move by one unit of the active
/// layout; `today` re-anchors without changing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub current: NaiveDate,
    pub view: CalendarView,
}

impl ViewState {
    pub fn new(current: NaiveDate, view: CalendarView) -> Self {
        Self { current, view }
    }

    pub fn previous(&mut self) {
        self.current = match self.view {
            CalendarView::Month => self
                .current
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.current),
            CalendarView::Week => self.current - TimeDelta::days(7),
            CalendarView::Day => self.current - TimeDelta::days(1),
        };
    }

    pub fn next(&mut self) {
        self.current = match self.view {
            CalendarView::Month => self
                .current
                .checked_add_months(Months::new(1))
                .unwrap_or(self.current),
            CalendarView::Week => self.current + TimeDelta::days(7),
            CalendarView::Day => self.current + TimeDelta::days(1),
        };
    }

    /// Jumps back to the given "today" date, keeping the active layout.
    pub fn today(&mut self, today: NaiveDate) {
        self.current = today;
    }

    pub fn set_view(&mut self, view: CalendarView) {
        self.view = view;
    }
}
