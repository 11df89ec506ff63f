//! Read-model commands for the presentation layer
//!
//! Each command pulls history from the state's `SetSource`, runs it through
//! the engine and returns a serializable view. None of them keep state of
//! their own; the PR cache is the only thing written.

pub mod attendance;
pub mod metrics;
pub mod records;

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Exercise, ExerciseId, SubjectId};
use crate::state::AppState;

const UNKNOWN_EXERCISE: &str = "Unknown";

/// Exercises of a subject keyed by id
fn exercise_index(state: &AppState, subject: SubjectId) -> Result<HashMap<ExerciseId, Exercise>> {
  Ok(
    state
      .source
      .exercises(subject)?
      .into_iter()
      .map(|e| (e.id, e))
      .collect(),
  )
}

fn exercise_label(index: &HashMap<ExerciseId, Exercise>, id: ExerciseId) -> (String, String) {
  index
    .get(&id)
    .map(|e| (e.name.clone(), e.muscle_group.clone()))
    .unwrap_or_else(|| (UNKNOWN_EXERCISE.to_string(), UNKNOWN_EXERCISE.to_string()))
}
