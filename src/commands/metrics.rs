//! Dashboard metrics commands

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::records::{current_record, label_records, ExerciseRecord};
use super::{exercise_index, exercise_label};
use crate::aggregation::{self, ProgressPoint, Window};
use crate::error::Result;
use crate::models::{ExerciseId, SubjectId};
use crate::state::AppState;
use crate::store::SetQuery;

/// Summary card for the current month plus all-time strength
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthMetrics {
    /// Sum of the best estimated maxima across all time
    pub total_strength: f64,
    pub monthly_volume: f64,
    pub monthly_sets: u64,
    pub prs_this_month: u64,
    /// Strongest exercises by estimated max
    pub top_lifts: Vec<ExerciseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopExercise {
    pub exercise_id: ExerciseId,
    pub exercise_name: String,
    pub muscle_group: String,
    pub volume: f64,
    pub set_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneRepMaxProgress {
    pub exercise_id: ExerciseId,
    pub window: Window,
    pub points: Vec<ProgressPoint>,
    /// All-time best, not limited to the window
    pub current_max: f64,
}

/// Training counters for the dashboard header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub total_sessions: u64,
    pub sessions_this_month: u64,
    pub total_sets: u64,
    /// Distinct exercises with at least one logged set
    pub exercises_trained: u64,
}

/// Strength metrics for the calendar month containing `today`
pub fn get_strength_metrics(
    state: &AppState,
    subject: SubjectId,
    today: NaiveDate,
) -> Result<StrengthMetrics> {
    let history = state.source.sets(subject, SetQuery::all())?;
    let month = Window::calendar_month(today)?;

    let records = aggregation::records_by_exercise(&history)?;
    let total_strength = aggregation::total_strength(&records, state.config.total_strength_lifts);
    let top = aggregation::top_by_estimated_max(&records, state.config.top_lifts);

    let report = aggregation::aggregate(&history, &month, 0)?;
    let prs_this_month = aggregation::count_records_in_window(&history, &month)?;

    tracing::debug!(
        subject,
        total_strength,
        monthly_sets = report.set_count,
        prs_this_month,
        "Computed strength metrics"
    );

    Ok(StrengthMetrics {
        total_strength,
        monthly_volume: report.total_volume,
        monthly_sets: report.set_count,
        prs_this_month,
        top_lifts: label_records(state, subject, &top)?,
    })
}

/// Lifetime session and set counts, plus sessions in the month of `today`
pub fn get_progress_stats(
    state: &AppState,
    subject: SubjectId,
    today: NaiveDate,
) -> Result<ProgressStats> {
    let month = Window::calendar_month(today)?;
    let sessions = state.source.sessions(subject)?;
    let sets = state.source.sets(subject, SetQuery::all())?;

    let sessions_this_month = sessions
        .iter()
        .filter(|s| s.date.and_hms_opt(0, 0, 0).is_some_and(|dt| month.contains(dt.and_utc())))
        .count() as u64;
    let exercises: HashSet<ExerciseId> = sets.iter().map(|s| s.exercise_id).collect();

    Ok(ProgressStats {
        total_sessions: sessions.len() as u64,
        sessions_this_month,
        total_sets: sets.len() as u64,
        exercises_trained: exercises.len() as u64,
    })
}

/// Exercises ranked by volume inside `window`
pub fn get_top_exercises(
    state: &AppState,
    subject: SubjectId,
    window: Window,
    k: usize,
) -> Result<Vec<TopExercise>> {
    let sets = state.source.sets(subject, SetQuery::all().within(window))?;
    let report = aggregation::aggregate(&sets, &window, k)?;
    let index = exercise_index(state, subject)?;

    Ok(report
        .breakdown
        .into_iter()
        .map(|entry| {
            let (exercise_name, muscle_group) = exercise_label(&index, entry.exercise_id);
            TopExercise {
                exercise_id: entry.exercise_id,
                exercise_name,
                muscle_group,
                volume: entry.volume,
                set_count: entry.set_count,
            }
        })
        .collect())
}

/// Daily best estimated max over the configured trailing window ending `today`
pub fn get_one_rep_max_progress(
    state: &AppState,
    subject: SubjectId,
    exercise_id: ExerciseId,
    today: NaiveDate,
) -> Result<OneRepMaxProgress> {
    let window = Window::trailing_days(today, state.config.progress_days)?;
    let sets = state
        .source
        .sets(subject, SetQuery::exercise(exercise_id).within(window))?;
    let points = aggregation::daily_best_estimates(&sets, &window)?;
    let current_max = current_record(state, subject, exercise_id)?.max_estimated;

    Ok(OneRepMaxProgress {
        exercise_id,
        window,
        points,
        current_max,
    })
}
