//! Weekly gym attendance against a days-per-week goal

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAttendance {
  pub date: NaiveDate,
  pub attended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReport {
  pub week_start: NaiveDate,
  /// Monday through Sunday
  pub days: [DayAttendance; 7],
  pub attended_count: u32,
  pub goal: u32,
  pub remaining: u32,
  pub on_track: bool,
}

impl AttendanceReport {
  pub fn week_end(&self) -> NaiveDate {
    self.days[6].date
  }

  /// Attended fraction of the goal, capped at 1.0. A zero goal counts as met.
  pub fn progress(&self) -> f32 {
    if self.goal == 0 {
      return 1.0;
    }
    (self.attended_count as f32 / self.goal as f32).min(1.0)
  }
}

/// Monday of the week containing `date`
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Attendance for the seven days starting at `week_start`.
///
/// Only those seven days are examined; dates outside the week are ignored.
/// Multi-week views call this once per week.
pub fn weekly_attendance(
  session_dates: &BTreeSet<NaiveDate>,
  week_start: NaiveDate,
  goal: u32,
) -> Result<AttendanceReport> {
  if week_start.weekday() != Weekday::Mon {
    return Err(EngineError::validation(format!(
      "week must start on a Monday, {} is a {}",
      week_start,
      week_start.weekday()
    )));
  }
  if goal == 0 {
    return Err(EngineError::validation("attendance goal must be at least 1"));
  }

  let days: [DayAttendance; 7] = std::array::from_fn(|offset| {
    let date = week_start + Duration::days(offset as i64);
    DayAttendance {
      date,
      attended: session_dates.contains(&date),
    }
  });

  let attended_count = days.iter().filter(|d| d.attended).count() as u32;

  Ok(AttendanceReport {
    week_start,
    days,
    attended_count,
    goal,
    remaining: goal.saturating_sub(attended_count),
    on_track: attended_count >= goal,
  })
}
