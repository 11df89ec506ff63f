use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type SubjectId = i64;
pub type ExerciseId = i64;
pub type SessionId = i64;
pub type SetId = i64;

/// Exercise reference data, created by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub id: ExerciseId,
  pub name: String,
  pub muscle_group: String,
}

/// A workout session; its date is what attendance counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
  pub id: SessionId,
  pub date: NaiveDate,
  pub notes: Option<String>,
  pub duration_minutes: Option<i64>,
}

/// One completed set. Weight is in kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
  pub id: SetId,
  pub session_id: SessionId,
  pub exercise_id: ExerciseId,
  pub weight_kg: f64,
  pub reps: u32,
  /// Rate of perceived exertion, 1-10
  pub rpe: Option<f64>,
  pub performed_at: DateTime<Utc>,
}

impl LoggedSet {
  /// Training volume of this set (weight x reps)
  pub fn volume(&self) -> f64 {
    self.weight_kg * self.reps as f64
  }
}
