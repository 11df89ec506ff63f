//! Personal record commands
//!
//! The PR cache is a projection of the set history:
//! - appended set -> `record_logged_set` folds it in incrementally
//! - deleted set or session -> `rebuild_records` refolds from scratch
//! - cache miss -> full fold, then cached

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{exercise_index, exercise_label};
use crate::classifier::{self, Classification, Gender};
use crate::error::{EngineError, Result};
use crate::estimator;
use crate::models::{ExerciseId, LoggedSet, SubjectId};
use crate::records::{self, PersonalRecord, RecordUpdate};
use crate::state::AppState;
use crate::store::SetQuery;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRecord {
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    pub muscle_group: String,
    #[serde(flatten)]
    pub record: PersonalRecord,
}

/// Most recent set of an exercise, shown as a target for the next one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousLog {
    pub weight_kg: f64,
    pub reps: u32,
    pub rpe: Option<f64>,
    pub performed_at: DateTime<Utc>,
    pub estimated_max: f64,
    /// Estimate crediting reps in reserve when an RPE was logged
    pub effort_adjusted_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseClassification {
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    /// Catalog key the exercise name resolved to
    pub matched_standard: String,
    pub record: PersonalRecord,
    pub classification: Classification,
}

// ---------------------------------------------------------------------------
// Cache maintenance
// ---------------------------------------------------------------------------

/// Fold a newly appended set into the cached record.
///
/// Call once per appended set, before or after it is stored. Once the source
/// holds the set, any read may already have cached a record that includes
/// it, so the previous record is refolded from the history without this set.
/// Otherwise the cached record is the previous one (folded on a miss).
pub fn record_logged_set(
    state: &AppState,
    subject: SubjectId,
    set: &LoggedSet,
) -> Result<RecordUpdate> {
    let cached = if state.source.has_set(subject, set.id)? {
        None
    } else {
        state.cache.get(subject, set.exercise_id)?
    };

    let existing = match cached {
        Some(record) => record,
        None => {
            let history = state.source.sets(subject, SetQuery::exercise(set.exercise_id))?;
            records::fold(history.iter().filter(|s| s.id != set.id))?
        }
    };

    let update = records::update(&existing, set)?;
    state.cache.put(subject, set.exercise_id, update.record)?;

    if update.is_new_pr() {
        tracing::info!(
            subject,
            exercise_id = set.exercise_id,
            estimated = update.improved.estimated,
            weight = update.improved.weight,
            reps = update.improved.reps,
            max_estimated = update.record.max_estimated,
            "New personal record"
        );
    }

    Ok(update)
}

/// Drop the cached record and rebuild it from the full history.
///
/// Required after any deletion: max is not invertible, so the incremental
/// path cannot remove a set.
pub fn rebuild_records(
    state: &AppState,
    subject: SubjectId,
    exercise_id: ExerciseId,
) -> Result<PersonalRecord> {
    state.cache.invalidate(subject, exercise_id)?;
    let history = state.source.sets(subject, SetQuery::exercise(exercise_id))?;
    let record = records::fold(&history)?;
    state.cache.put(subject, exercise_id, record)?;

    tracing::info!(
        subject,
        exercise_id,
        total_sets = record.total_sets,
        max_estimated = record.max_estimated,
        "Rebuilt personal record"
    );
    Ok(record)
}

/// Rebuild every exercise touched by a deleted session
pub fn handle_session_deleted(
    state: &AppState,
    subject: SubjectId,
    touched: &[ExerciseId],
) -> Result<Vec<(ExerciseId, PersonalRecord)>> {
    touched
        .iter()
        .map(|&id| rebuild_records(state, subject, id).map(|r| (id, r)))
        .collect()
}

/// Cached record, falling back to a full fold that repopulates the cache
pub fn current_record(
    state: &AppState,
    subject: SubjectId,
    exercise_id: ExerciseId,
) -> Result<PersonalRecord> {
    if let Some(record) = state.cache.get(subject, exercise_id)? {
        return Ok(record);
    }
    let history = state.source.sets(subject, SetQuery::exercise(exercise_id))?;
    let record = records::fold(&history)?;
    state.cache.put(subject, exercise_id, record)?;
    Ok(record)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Personal records of every logged exercise, best estimated max first
pub fn get_exercise_records(state: &AppState, subject: SubjectId) -> Result<Vec<ExerciseRecord>> {
    let exercises = state.source.exercises(subject)?;

    let mut out = Vec::new();
    for exercise in exercises {
        let record = current_record(state, subject, exercise.id)?;
        if record.is_empty() {
            continue;
        }
        out.push(ExerciseRecord {
            exercise_id: exercise.id,
            exercise_name: exercise.name,
            muscle_group: exercise.muscle_group,
            record,
        });
    }
    out.sort_by(|a, b| b.record.max_estimated.total_cmp(&a.record.max_estimated));

    tracing::debug!(subject, exercises = out.len(), "Loaded exercise records");
    Ok(out)
}

/// Last logged set of an exercise, `None` if it was never done
pub fn get_previous_log(
    state: &AppState,
    subject: SubjectId,
    exercise_id: ExerciseId,
) -> Result<Option<PreviousLog>> {
    let history = state.source.sets(subject, SetQuery::exercise(exercise_id))?;
    let Some(last) = history.last() else {
        return Ok(None);
    };

    Ok(Some(PreviousLog {
        weight_kg: last.weight_kg,
        reps: last.reps,
        rpe: last.rpe,
        performed_at: last.performed_at,
        estimated_max: estimator::estimate(last.weight_kg, last.reps)?,
        effort_adjusted_max: estimator::estimate_with_effort(last.weight_kg, last.reps, last.rpe)?,
    }))
}

/// Strength tier of one exercise at the given bodyweight.
///
/// `None` when the exercise has no history or no matching standard.
pub fn get_exercise_classification(
    state: &AppState,
    subject: SubjectId,
    exercise_id: ExerciseId,
    body_weight: f64,
    gender: Gender,
) -> Result<Option<ExerciseClassification>> {
    let index = exercise_index(state, subject)?;
    let exercise = index
        .get(&exercise_id)
        .ok_or_else(|| EngineError::validation(format!("unknown exercise {}", exercise_id)))?;

    let record = current_record(state, subject, exercise_id)?;
    if record.is_empty() {
        return Ok(None);
    }

    classify_record(state, exercise_id, &exercise.name, record, body_weight, gender)
}

/// Strength tiers for every logged exercise, unclassifiable ones skipped
pub fn get_strength_levels(
    state: &AppState,
    subject: SubjectId,
    body_weight: f64,
    gender: Gender,
) -> Result<Vec<ExerciseClassification>> {
    let mut out = Vec::new();
    for entry in get_exercise_records(state, subject)? {
        if let Some(c) = classify_record(
            state,
            entry.exercise_id,
            &entry.exercise_name,
            entry.record,
            body_weight,
            gender,
        )? {
            out.push(c);
        }
    }
    Ok(out)
}

fn classify_record(
    state: &AppState,
    exercise_id: ExerciseId,
    exercise_name: &str,
    record: PersonalRecord,
    body_weight: f64,
    gender: Gender,
) -> Result<Option<ExerciseClassification>> {
    let Some((matched_standard, row)) = state.catalog.lookup_with_key(exercise_name) else {
        tracing::warn!(exercise_id, exercise_name, "No strength standard matches exercise");
        return Ok(None);
    };

    let classification = classifier::classify(
        row,
        record.max_estimated,
        body_weight,
        gender,
        &state.config.gender_factors,
    )?;

    Ok(Some(ExerciseClassification {
        exercise_id,
        exercise_name: exercise_name.to_string(),
        matched_standard: matched_standard.to_string(),
        record,
        classification,
    }))
}

/// Records with display labels for exercises that may be missing from the
/// catalog of the subject
pub(crate) fn label_records(
    state: &AppState,
    subject: SubjectId,
    records: &[(ExerciseId, PersonalRecord)],
) -> Result<Vec<ExerciseRecord>> {
    let index = exercise_index(state, subject)?;
    Ok(records
        .iter()
        .map(|(id, record)| {
            let (exercise_name, muscle_group) = exercise_label(&index, *id);
            ExerciseRecord {
                exercise_id: *id,
                exercise_name,
                muscle_group,
                record: *record,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
