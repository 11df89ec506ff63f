//! Weekly attendance command

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::attendance::{week_start_for, weekly_attendance, AttendanceReport};
use crate::error::Result;
use crate::models::SubjectId;
use crate::state::AppState;

/// Attendance for the week containing `today`.
///
/// `goal` falls back to the configured weekly goal.
pub fn get_weekly_attendance(
    state: &AppState,
    subject: SubjectId,
    today: NaiveDate,
    goal: Option<u32>,
) -> Result<AttendanceReport> {
    let dates: BTreeSet<NaiveDate> = state
        .source
        .sessions(subject)?
        .into_iter()
        .map(|s| s.date)
        .collect();

    let goal = goal.unwrap_or(state.config.weekly_goal);
    let report = weekly_attendance(&dates, week_start_for(today), goal)?;

    tracing::debug!(
        subject,
        week_start = %report.week_start,
        attended = report.attended_count,
        goal,
        "Computed weekly attendance"
    );
    Ok(report)
}
