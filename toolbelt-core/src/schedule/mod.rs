mod grid;
mod reschedule;
mod view;

pub use grid::{
    MonthCell, jobs_in_slot, jobs_on_day, month_cell, month_span, week_span, hour_rows,
    DAY_END_HOUR, DAY_START_HOUR, MONTH_CELL_CAP,
};
pub use reschedule::{DragPhase, DragReschedule, DropTarget, ScheduleError, drop_schedule,
    DEFAULT_DROP_HOUR};
pub use view::{CalendarView, ViewState};
