//! Time-windowed training aggregates
//!
//! Everything here filters a set history to a half-open `[start, end)`
//! window first. Rankings use Rust's stable sort, so equal values keep the
//! order in which their exercise first appeared in the input.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::estimator;
use crate::models::{ExerciseId, LoggedSet};
use crate::records::{self, PersonalRecord};

/// ---------------------------------------------------------------------------
/// Windows
/// ---------------------------------------------------------------------------

/// Half-open timestamp range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
  start: DateTime<Utc>,
  end: DateTime<Utc>,
}

impl Window {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
    if start > end {
      return Err(EngineError::validation(format!(
        "window start {} is after end {}",
        start, end
      )));
    }
    Ok(Self { start, end })
  }

  /// The calendar month (UTC) containing `date`
  pub fn calendar_month(date: NaiveDate) -> Result<Self> {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1);
    let next_first = if date.month() == 12 {
      NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
      NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    match (first, next_first) {
      (Some(first), Some(next_first)) => Self::new(start_of_day(first)?, start_of_day(next_first)?),
      _ => Err(EngineError::validation(format!("no calendar month for {}", date))),
    }
  }

  /// The `days` whole days ending with (and including) `today`
  pub fn trailing_days(today: NaiveDate, days: u32) -> Result<Self> {
    if days == 0 {
      return Err(EngineError::validation("trailing window needs at least one day"));
    }
    let out_of_range =
      || EngineError::validation(format!("{} days before {} is out of range", days, today));
    let first = today
      .checked_sub_signed(Duration::days(days as i64 - 1))
      .ok_or_else(out_of_range)?;
    let end = today
      .checked_add_signed(Duration::days(1))
      .ok_or_else(out_of_range)?;
    Self::new(start_of_day(first)?, start_of_day(end)?)
  }

  pub fn start(&self) -> DateTime<Utc> {
    self.start
  }

  pub fn end(&self) -> DateTime<Utc> {
    self.end
  }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.start <= at && at < self.end
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

fn start_of_day(date: NaiveDate) -> Result<DateTime<Utc>> {
  date
    .and_hms_opt(0, 0, 0)
    .map(|dt| dt.and_utc())
    .ok_or_else(|| EngineError::validation(format!("invalid date {}", date)))
}

/// ---------------------------------------------------------------------------
/// Volume Report
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseVolume {
  pub exercise_id: ExerciseId,
  pub volume: f64,
  pub set_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
  pub window: Window,
  pub total_volume: f64,
  pub set_count: u64,
  /// Highest volume first, truncated to the requested top-K
  pub breakdown: Vec<ExerciseVolume>,
}

/// Sum volume and sets inside `window`, ranking exercises by volume.
///
/// `top_k` larger than the number of exercises returns all of them. Totals
/// always cover every set in the window, not just the top-K.
pub fn aggregate<'a, I>(sets: I, window: &Window, top_k: usize) -> Result<AggregateReport>
where
  I: IntoIterator<Item = &'a LoggedSet>,
{
  let mut total_volume = 0.0;
  let mut set_count = 0u64;
  let mut breakdown: Vec<ExerciseVolume> = Vec::new();
  let mut positions: HashMap<ExerciseId, usize> = HashMap::new();

  for set in sets.into_iter().filter(|s| window.contains(s.performed_at)) {
    validate_set(set)?;
    let volume = set.volume();
    total_volume += volume;
    set_count += 1;

    let idx = *positions.entry(set.exercise_id).or_insert_with(|| {
      breakdown.push(ExerciseVolume {
        exercise_id: set.exercise_id,
        volume: 0.0,
        set_count: 0,
      });
      breakdown.len() - 1
    });
    breakdown[idx].volume += volume;
    breakdown[idx].set_count += 1;
  }

  // slice::sort_by is stable: ties stay in first-seen order
  breakdown.sort_by(|a, b| b.volume.total_cmp(&a.volume));
  breakdown.truncate(top_k);

  Ok(AggregateReport {
    window: *window,
    total_volume,
    set_count,
    breakdown,
  })
}

fn validate_set(set: &LoggedSet) -> Result<()> {
  if !set.weight_kg.is_finite() || set.weight_kg <= 0.0 || set.reps == 0 {
    return Err(EngineError::validation(format!(
      "set {} has non-positive weight or reps",
      set.id
    )));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Record Rankings
/// ---------------------------------------------------------------------------

/// Exercises ranked by estimated max, empty records dropped
pub fn top_by_estimated_max(
  records: &[(ExerciseId, PersonalRecord)],
  k: usize,
) -> Vec<(ExerciseId, PersonalRecord)> {
  let mut ranked: Vec<(ExerciseId, PersonalRecord)> = records
    .iter()
    .filter(|(_, r)| !r.is_empty())
    .copied()
    .collect();
  ranked.sort_by(|a, b| b.1.max_estimated.total_cmp(&a.1.max_estimated));
  ranked.truncate(k);
  ranked
}

/// Total-strength score: the best `lifts` estimated maxima added together
pub fn total_strength(records: &[(ExerciseId, PersonalRecord)], lifts: usize) -> f64 {
  top_by_estimated_max(records, lifts)
    .iter()
    .map(|(_, r)| r.max_estimated)
    .sum()
}

/// Count sets inside `window` that set a new personal record when each
/// exercise's full history is replayed in time order. An exercise's first
/// ever set counts.
pub fn count_records_in_window(history: &[LoggedSet], window: &Window) -> Result<u64> {
  let mut count = 0;
  for (_, mut sets) in group_by_exercise(history) {
    sets.sort_by_key(|s| s.performed_at);
    count += records::replay(sets)?
      .iter()
      .filter(|(set, u)| u.is_new_pr() && window.contains(set.performed_at))
      .count() as u64;
  }
  Ok(count)
}

/// Group sets by exercise, exercises in first-seen order
pub fn group_by_exercise(history: &[LoggedSet]) -> Vec<(ExerciseId, Vec<&LoggedSet>)> {
  let mut groups: Vec<(ExerciseId, Vec<&LoggedSet>)> = Vec::new();
  let mut positions: HashMap<ExerciseId, usize> = HashMap::new();
  for set in history {
    let idx = *positions.entry(set.exercise_id).or_insert_with(|| {
      groups.push((set.exercise_id, Vec::new()));
      groups.len() - 1
    });
    groups[idx].1.push(set);
  }
  groups
}

/// Fold every exercise's history into its personal record
pub fn records_by_exercise(history: &[LoggedSet]) -> Result<Vec<(ExerciseId, PersonalRecord)>> {
  group_by_exercise(history)
    .into_iter()
    .map(|(id, sets)| records::fold(sets).map(|r| (id, r)))
    .collect()
}

/// ---------------------------------------------------------------------------
/// Estimated Max Progress
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressPoint {
  pub date: NaiveDate,
  pub best_estimate: f64,
  pub best_weight: f64,
  pub set_count: u64,
}

/// Best estimated max per calendar day inside `window`, oldest first
pub fn daily_best_estimates<'a, I>(sets: I, window: &Window) -> Result<Vec<ProgressPoint>>
where
  I: IntoIterator<Item = &'a LoggedSet>,
{
  let mut days: BTreeMap<NaiveDate, ProgressPoint> = BTreeMap::new();
  for set in sets.into_iter().filter(|s| window.contains(s.performed_at)) {
    let estimate = estimator::estimate(set.weight_kg, set.reps)?;
    let date = set.performed_at.date_naive();
    let point = days.entry(date).or_insert(ProgressPoint {
      date,
      best_estimate: 0.0,
      best_weight: 0.0,
      set_count: 0,
    });
    point.best_estimate = point.best_estimate.max(estimate);
    point.best_weight = point.best_weight.max(set.weight_kg);
    point.set_count += 1;
  }
  Ok(days.into_values().collect())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{base_time, make_set};
  use chrono::TimeZone;

  fn march() -> Window {
    Window::calendar_month(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()).unwrap()
  }

  #[test]
  fn test_window_rejects_inverted_bounds() {
    let now = base_time();
    assert!(Window::new(now, now - Duration::hours(1)).unwrap_err().is_validation());
    assert!(Window::new(now, now).unwrap().is_empty());
  }

  #[test]
  fn test_window_is_half_open() {
    let w = march();
    assert_eq!(w.start(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    assert_eq!(w.end(), Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
    assert!(w.contains(w.start()));
    assert!(!w.contains(w.end()));
  }

  #[test]
  fn test_december_rolls_into_next_year() {
    let w = Window::calendar_month(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()).unwrap();
    assert_eq!(w.end(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
  }

  #[test]
  fn test_trailing_days_includes_today() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let w = Window::trailing_days(today, 7).unwrap();
    assert_eq!(w.start(), Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
    assert_eq!(w.end(), Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    assert!(Window::trailing_days(today, 0).is_err());
  }

  #[test]
  fn test_trailing_days_out_of_calendar_range() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
    let err = Window::trailing_days(today, 4_000_000_000).unwrap_err();
    assert!(err.is_validation());
    assert!(Window::trailing_days(NaiveDate::MAX, 1).unwrap_err().is_validation());
  }

  #[test]
  fn test_monthly_volume_scenario() {
    // base_time is 2024-03-04
    let sets = vec![
      make_set(1, 1, 50.0, 10, 0),
      make_set(2, 1, 60.0, 8, 2),
      make_set(3, 2, 20.0, 15, 4),
    ];
    let report = aggregate(&sets, &march(), 10).unwrap();

    assert_approx_eq!(report.total_volume, 1280.0, 1e-9);
    assert_eq!(report.set_count, 3);
    assert_eq!(report.breakdown.len(), 2);
    assert_eq!(report.breakdown[0].exercise_id, 1);
    assert_approx_eq!(report.breakdown[0].volume, 980.0, 1e-9);
    assert_eq!(report.breakdown[0].set_count, 2);
    assert_eq!(report.breakdown[1].exercise_id, 2);
  }

  #[test]
  fn test_sets_outside_window_are_ignored() {
    let sets = vec![make_set(1, 1, 50.0, 10, 0), make_set(2, 1, 60.0, 8, 40)];
    let report = aggregate(&sets, &march(), 5).unwrap();
    assert_eq!(report.set_count, 1);
    assert_approx_eq!(report.total_volume, 500.0, 1e-9);
  }

  #[test]
  fn test_volume_is_conserved() {
    let sets: Vec<_> = (0..30)
      .map(|i| make_set(i, i % 7, 20.0 + i as f64, 1 + (i % 12) as u32, i % 20))
      .collect();
    let report = aggregate(&sets, &march(), usize::MAX).unwrap();
    let breakdown_total: f64 = report.breakdown.iter().map(|e| e.volume).sum();
    let breakdown_sets: u64 = report.breakdown.iter().map(|e| e.set_count).sum();
    assert_approx_eq!(breakdown_total, report.total_volume, 1e-6);
    assert_eq!(breakdown_sets, report.set_count);
  }

  #[test]
  fn test_ties_keep_first_seen_order() {
    let sets = vec![
      make_set(1, 30, 10.0, 10, 0),
      make_set(2, 10, 20.0, 5, 0),
      make_set(3, 20, 50.0, 2, 0),
      make_set(4, 40, 100.0, 5, 0),
    ];
    let report = aggregate(&sets, &march(), 10).unwrap();
    let order: Vec<_> = report.breakdown.iter().map(|e| e.exercise_id).collect();
    assert_eq!(order, vec![40, 30, 10, 20]);
  }

  #[test]
  fn test_top_k_truncates() {
    let sets = vec![
      make_set(1, 1, 100.0, 5, 0),
      make_set(2, 2, 50.0, 5, 0),
      make_set(3, 3, 10.0, 5, 0),
    ];
    let report = aggregate(&sets, &march(), 2).unwrap();
    assert_eq!(report.breakdown.len(), 2);
    assert_approx_eq!(report.total_volume, 800.0, 1e-9);
  }

  #[test]
  fn test_empty_window_is_zero_report() {
    let sets: Vec<LoggedSet> = Vec::new();
    let report = aggregate(&sets, &march(), 5).unwrap();
    assert_eq!(report.total_volume, 0.0);
    assert_eq!(report.set_count, 0);
    assert!(report.breakdown.is_empty());
  }

  #[test]
  fn test_invalid_set_in_window_is_rejected() {
    let sets = vec![make_set(1, 1, -10.0, 5, 0)];
    assert!(aggregate(&sets, &march(), 5).unwrap_err().is_validation());
  }

  #[test]
  fn test_total_strength_sums_top_lifts() {
    let records = vec![
      (1, PersonalRecord { max_estimated: 100.0, max_weight: 90.0, max_reps: 5, total_sets: 4 }),
      (2, PersonalRecord { max_estimated: 180.0, max_weight: 160.0, max_reps: 5, total_sets: 4 }),
      (3, PersonalRecord { max_estimated: 140.0, max_weight: 120.0, max_reps: 5, total_sets: 4 }),
      (4, PersonalRecord { max_estimated: 60.0, max_weight: 50.0, max_reps: 8, total_sets: 2 }),
      (5, PersonalRecord::default()),
    ];
    assert_approx_eq!(total_strength(&records, 3), 420.0, 1e-9);

    let top = top_by_estimated_max(&records, 10);
    let ids: Vec<_> = top.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![2, 3, 1, 4]);
  }

  #[test]
  fn test_records_counted_in_window() {
    let sets = vec![
      // February: first bench set is a PR but outside the window
      make_set(1, 1, 100.0, 5, -10),
      // March: one improvement, one repeat
      make_set(2, 1, 105.0, 5, 1),
      make_set(3, 1, 100.0, 5, 2),
      // March: first squat set counts
      make_set(4, 2, 140.0, 3, 3),
    ];
    assert_eq!(count_records_in_window(&sets, &march()).unwrap(), 2);
  }

  #[test]
  fn test_record_count_replays_in_time_order() {
    // logged out of order: the heavier set happened first
    let sets = vec![make_set(2, 1, 90.0, 5, 3), make_set(1, 1, 100.0, 5, 1)];
    assert_eq!(count_records_in_window(&sets, &march()).unwrap(), 1);
  }

  #[test]
  fn test_daily_best_estimates() {
    let sets = vec![
      make_set(1, 1, 100.0, 1, 0),
      make_set(2, 1, 90.0, 5, 0),
      make_set(3, 1, 80.0, 8, 3),
    ];
    let points = daily_best_estimates(&sets, &march()).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    assert_approx_eq!(points[0].best_estimate, 105.0, 1e-9);
    assert_eq!(points[0].best_weight, 100.0);
    assert_eq!(points[0].set_count, 2);
    assert!(points[0].date < points[1].date);
  }
}
