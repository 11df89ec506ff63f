//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Mock data factories
//! - A seeded in-memory store
//! - Helper assertions

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::config::EngineConfig;
use crate::models::{Exercise, ExerciseId, LoggedSet, SetId, SubjectId, WorkoutSession};
use crate::standards::StrengthStandardsCatalog;
use crate::state::AppState;
use crate::store::MemoryStore;

pub const SUBJECT: SubjectId = 7;

pub const BENCH: ExerciseId = 1;
pub const SQUAT: ExerciseId = 2;
pub const HIP_THRUST: ExerciseId = 3;

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Monday 2024-03-04, 18:00 UTC
pub fn base_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap()
}

pub fn base_date() -> NaiveDate {
  base_time().date_naive()
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A set performed `day_offset` days after `base_time`, in session `100 + day_offset`
pub fn make_set(id: SetId, exercise_id: ExerciseId, weight_kg: f64, reps: u32, day_offset: i64) -> LoggedSet {
  LoggedSet {
    id,
    session_id: 100 + day_offset,
    exercise_id,
    weight_kg,
    reps,
    rpe: None,
    performed_at: base_time() + Duration::days(day_offset),
  }
}

pub fn make_session(day_offset: i64) -> WorkoutSession {
  WorkoutSession {
    id: 100 + day_offset,
    date: base_date() + Duration::days(day_offset),
    notes: None,
    duration_minutes: Some(60),
  }
}

pub fn make_exercise(id: ExerciseId, name: &str, muscle_group: &str) -> Exercise {
  Exercise {
    id,
    name: name.to_string(),
    muscle_group: muscle_group.to_string(),
  }
}

/// Store with three exercises and sessions on Monday, Wednesday and Friday
/// of the week of `base_time`
pub fn seeded_store() -> MemoryStore {
  let store = MemoryStore::new();
  store.insert_exercise(SUBJECT, make_exercise(BENCH, "Bench Press", "chest")).unwrap();
  store.insert_exercise(SUBJECT, make_exercise(SQUAT, "Barbell Back Squat", "legs")).unwrap();
  store.insert_exercise(SUBJECT, make_exercise(HIP_THRUST, "Hip Thrust", "glutes")).unwrap();

  for day in [0, 2, 4] {
    store.insert_session(SUBJECT, make_session(day)).unwrap();
  }

  let sets = vec![
    make_set(1, BENCH, 80.0, 5, 0),
    make_set(2, BENCH, 85.0, 3, 0),
    make_set(3, SQUAT, 100.0, 5, 0),
    make_set(4, BENCH, 82.5, 5, 2),
    make_set(5, SQUAT, 110.0, 3, 2),
    make_set(6, HIP_THRUST, 120.0, 10, 2),
    make_set(7, BENCH, 90.0, 2, 4),
    make_set(8, SQUAT, 105.0, 5, 4),
  ];
  for set in sets {
    store.insert_set(SUBJECT, set).unwrap();
  }
  store
}

/// Application state over a seeded store, default catalog and config
pub fn seeded_state() -> (Arc<MemoryStore>, AppState) {
  let store = Arc::new(seeded_store());
  let state = AppState::new(
    store.clone(),
    store.clone(),
    StrengthStandardsCatalog::default(),
    EngineConfig::default(),
  );
  (store, state)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::{SetQuery, SetSource};

  #[test]
  fn test_seeded_store_contents() {
    let store = seeded_store();
    assert_eq!(store.exercises(SUBJECT).unwrap().len(), 3);
    assert_eq!(store.sessions(SUBJECT).unwrap().len(), 3);
    assert_eq!(store.sets(SUBJECT, SetQuery::all()).unwrap().len(), 8);
  }

  #[test]
  fn test_make_set_offsets_days() {
    let set = make_set(1, BENCH, 100.0, 5, 3);
    assert_eq!((set.performed_at - base_time()).num_days(), 3);
    assert_eq!(set.session_id, 103);
  }
}
