//! Collaborator seams
//!
//! The engine never talks to a database. Callers hand it a `SetSource` to
//! read history from and a `RecordCache` to keep derived personal records
//! in. `MemoryStore` implements both for tests and embedded use.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::aggregation::Window;
use crate::error::{EngineError, Result};
use crate::models::{Exercise, ExerciseId, LoggedSet, SessionId, SetId, SubjectId, WorkoutSession};
use crate::records::PersonalRecord;

/// Filters for a history read
#[derive(Debug, Clone, Copy, Default)]
pub struct SetQuery {
  pub exercise_id: Option<ExerciseId>,
  pub window: Option<Window>,
}

impl SetQuery {
  pub fn all() -> Self {
    Self::default()
  }

  pub fn exercise(exercise_id: ExerciseId) -> Self {
    Self {
      exercise_id: Some(exercise_id),
      window: None,
    }
  }

  pub fn within(mut self, window: Window) -> Self {
    self.window = Some(window);
    self
  }

  pub fn matches(&self, set: &LoggedSet) -> bool {
    self.exercise_id.map_or(true, |id| id == set.exercise_id)
      && self.window.map_or(true, |w| w.contains(set.performed_at))
  }
}

/// Read interface over logged training data
pub trait SetSource: Send + Sync {
  fn exercises(&self, subject: SubjectId) -> Result<Vec<Exercise>>;

  /// Matching sets, oldest first
  fn sets(&self, subject: SubjectId, query: SetQuery) -> Result<Vec<LoggedSet>>;

  fn sessions(&self, subject: SubjectId) -> Result<Vec<WorkoutSession>>;

  /// Whether the set with this id is already stored
  fn has_set(&self, subject: SubjectId, set_id: SetId) -> Result<bool>;
}

/// Write interface for cached personal records
pub trait RecordCache: Send + Sync {
  fn get(&self, subject: SubjectId, exercise_id: ExerciseId) -> Result<Option<PersonalRecord>>;

  fn put(&self, subject: SubjectId, exercise_id: ExerciseId, record: PersonalRecord) -> Result<()>;

  fn invalidate(&self, subject: SubjectId, exercise_id: ExerciseId) -> Result<()>;
}

/// ---------------------------------------------------------------------------
/// In-memory implementation
/// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SubjectData {
  exercises: Vec<Exercise>,
  sessions: Vec<WorkoutSession>,
  sets: Vec<LoggedSet>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  subjects: RwLock<HashMap<SubjectId, SubjectData>>,
  records: RwLock<HashMap<(SubjectId, ExerciseId), PersonalRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_exercise(&self, subject: SubjectId, exercise: Exercise) -> Result<()> {
    let mut subjects = self.subjects.write();
    let data = subjects.entry(subject).or_default();
    if data.exercises.iter().any(|e| e.id == exercise.id) {
      return Err(EngineError::Storage(format!("exercise {} already exists", exercise.id)));
    }
    data.exercises.push(exercise);
    Ok(())
  }

  pub fn insert_session(&self, subject: SubjectId, session: WorkoutSession) -> Result<()> {
    let mut subjects = self.subjects.write();
    let data = subjects.entry(subject).or_default();
    if data.sessions.iter().any(|s| s.id == session.id) {
      return Err(EngineError::Storage(format!("session {} already exists", session.id)));
    }
    data.sessions.push(session);
    Ok(())
  }

  /// Store a set; its session and exercise must already exist
  pub fn insert_set(&self, subject: SubjectId, set: LoggedSet) -> Result<()> {
    let mut subjects = self.subjects.write();
    let data = subjects.entry(subject).or_default();
    if !data.sessions.iter().any(|s| s.id == set.session_id) {
      return Err(EngineError::Storage(format!("unknown session {}", set.session_id)));
    }
    if !data.exercises.iter().any(|e| e.id == set.exercise_id) {
      return Err(EngineError::Storage(format!("unknown exercise {}", set.exercise_id)));
    }
    data.sets.push(set);
    Ok(())
  }

  /// Remove a session and all of its sets.
  ///
  /// Returns the exercises whose history changed. Their cached records are
  /// stale and must be rebuilt with a full fold.
  pub fn delete_session(&self, subject: SubjectId, session_id: SessionId) -> Result<Vec<ExerciseId>> {
    let mut subjects = self.subjects.write();
    let data = subjects
      .get_mut(&subject)
      .ok_or_else(|| EngineError::Storage(format!("unknown subject {}", subject)))?;

    let before = data.sessions.len();
    data.sessions.retain(|s| s.id != session_id);
    if data.sessions.len() == before {
      return Err(EngineError::Storage(format!("unknown session {}", session_id)));
    }

    let mut touched: Vec<ExerciseId> = Vec::new();
    for set in data.sets.iter().filter(|s| s.session_id == session_id) {
      if !touched.contains(&set.exercise_id) {
        touched.push(set.exercise_id);
      }
    }
    data.sets.retain(|s| s.session_id != session_id);
    Ok(touched)
  }
}

impl SetSource for MemoryStore {
  fn exercises(&self, subject: SubjectId) -> Result<Vec<Exercise>> {
    Ok(
      self
        .subjects
        .read()
        .get(&subject)
        .map(|d| d.exercises.clone())
        .unwrap_or_default(),
    )
  }

  fn sets(&self, subject: SubjectId, query: SetQuery) -> Result<Vec<LoggedSet>> {
    let subjects = self.subjects.read();
    let mut sets: Vec<LoggedSet> = subjects
      .get(&subject)
      .map(|d| d.sets.iter().filter(|s| query.matches(s)).cloned().collect())
      .unwrap_or_default();
    sets.sort_by_key(|s| s.performed_at);
    Ok(sets)
  }

  fn sessions(&self, subject: SubjectId) -> Result<Vec<WorkoutSession>> {
    Ok(
      self
        .subjects
        .read()
        .get(&subject)
        .map(|d| d.sessions.clone())
        .unwrap_or_default(),
    )
  }

  fn has_set(&self, subject: SubjectId, set_id: SetId) -> Result<bool> {
    Ok(
      self
        .subjects
        .read()
        .get(&subject)
        .is_some_and(|d| d.sets.iter().any(|s| s.id == set_id)),
    )
  }
}

impl RecordCache for MemoryStore {
  fn get(&self, subject: SubjectId, exercise_id: ExerciseId) -> Result<Option<PersonalRecord>> {
    Ok(self.records.read().get(&(subject, exercise_id)).copied())
  }

  fn put(&self, subject: SubjectId, exercise_id: ExerciseId, record: PersonalRecord) -> Result<()> {
    self.records.write().insert((subject, exercise_id), record);
    Ok(())
  }

  fn invalidate(&self, subject: SubjectId, exercise_id: ExerciseId) -> Result<()> {
    self.records.write().remove(&(subject, exercise_id));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{make_set, seeded_store, SUBJECT};

  #[test]
  fn test_sets_are_returned_oldest_first() {
    let store = seeded_store();
    let sets = store.sets(SUBJECT, SetQuery::all()).unwrap();
    assert!(!sets.is_empty());
    assert!(sets.windows(2).all(|w| w[0].performed_at <= w[1].performed_at));
  }

  #[test]
  fn test_query_filters_by_exercise_and_window() {
    let store = seeded_store();
    let bench = store.sets(SUBJECT, SetQuery::exercise(1)).unwrap();
    assert!(bench.iter().all(|s| s.exercise_id == 1));

    let window = Window::new(
      crate::test_utils::base_time(),
      crate::test_utils::base_time() + chrono::Duration::days(1),
    )
    .unwrap();
    let day_one = store.sets(SUBJECT, SetQuery::exercise(1).within(window)).unwrap();
    assert!(day_one.len() < bench.len());
    assert!(day_one.iter().all(|s| window.contains(s.performed_at)));
  }

  #[test]
  fn test_unknown_subject_has_no_history() {
    let store = seeded_store();
    assert!(store.sets(999, SetQuery::all()).unwrap().is_empty());
    assert!(store.exercises(999).unwrap().is_empty());
    assert!(!store.has_set(999, 1).unwrap());
  }

  #[test]
  fn test_has_set_tracks_storage() {
    let store = seeded_store();
    assert!(store.has_set(SUBJECT, 1).unwrap());
    assert!(!store.has_set(SUBJECT, 600).unwrap());
    store.insert_set(SUBJECT, make_set(600, 1, 50.0, 5, 0)).unwrap();
    assert!(store.has_set(SUBJECT, 600).unwrap());
  }

  #[test]
  fn test_insert_set_requires_session_and_exercise() {
    let store = seeded_store();
    let mut orphan = make_set(500, 1, 50.0, 5, 0);
    orphan.session_id = 9999;
    assert!(matches!(store.insert_set(SUBJECT, orphan), Err(EngineError::Storage(_))));

    let unknown_exercise = make_set(501, 77, 50.0, 5, 0);
    assert!(store.insert_set(SUBJECT, unknown_exercise).is_err());
  }

  #[test]
  fn test_delete_session_reports_touched_exercises() {
    let store = seeded_store();
    let first_session = store.sessions(SUBJECT).unwrap()[0].id;
    let touched = store.delete_session(SUBJECT, first_session).unwrap();

    assert!(!touched.is_empty());
    assert!(store
      .sets(SUBJECT, SetQuery::all())
      .unwrap()
      .iter()
      .all(|s| s.session_id != first_session));
    assert!(store.delete_session(SUBJECT, first_session).is_err());
  }

  #[test]
  fn test_record_cache_roundtrip() {
    let store = MemoryStore::new();
    let record = PersonalRecord {
      max_estimated: 120.0,
      max_weight: 100.0,
      max_reps: 8,
      total_sets: 12,
    };
    assert_eq!(store.get(1, 2).unwrap(), None);
    store.put(1, 2, record).unwrap();
    assert_eq!(store.get(1, 2).unwrap(), Some(record));
    store.invalidate(1, 2).unwrap();
    assert_eq!(store.get(1, 2).unwrap(), None);
  }
}
