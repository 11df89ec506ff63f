//! Personal Record Tracking
//!
//! A personal record is the fold of an exercise's entire set history:
//! - best estimated one-rep max
//! - heaviest raw weight (any rep count)
//! - most reps (any weight)
//! - lifetime set count
//!
//! The three maxima are independent, they need not come from the same set.
//!
//! Two ways to get a record:
//! - `fold` rebuilds it from the full history
//! - `update` folds in one appended set and reports whether it was a PR
//!
//! `max` has no inverse, so there is no incremental removal. After a set or
//! session is deleted the record MUST be rebuilt with `fold`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::estimator;
use crate::models::LoggedSet;

// ---------------------------------------------------------------------------
/// Personal Record: running maxima for one exercise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub max_estimated: f64,
    pub max_weight: f64,
    pub max_reps: u32,
    pub total_sets: u64,
}

impl PersonalRecord {
    /// True for the record of an exercise that was never logged
    pub fn is_empty(&self) -> bool {
        self.total_sets == 0
    }
}

// ---------------------------------------------------------------------------
/// Which maxima a set improved
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrFlags {
    pub estimated: bool,
    pub weight: bool,
    pub reps: bool,
}

impl PrFlags {
    pub fn any(&self) -> bool {
        self.estimated || self.weight || self.reps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub record: PersonalRecord,
    pub improved: PrFlags,
    /// Estimated max of the set that was folded in
    pub set_estimate: f64,
}

impl RecordUpdate {
    /// Strictly better on at least one tracked maximum. Ties are not PRs.
    pub fn is_new_pr(&self) -> bool {
        self.improved.any()
    }
}

// ---------------------------------------------------------------------------
// Folding
// ---------------------------------------------------------------------------

/// Fold one newly appended set into an existing record.
///
/// Never decreases any field of `existing`. Only valid for appends: a
/// deletion must go through [`fold`].
pub fn update(existing: &PersonalRecord, set: &LoggedSet) -> Result<RecordUpdate> {
    let set_estimate = estimator::estimate(set.weight_kg, set.reps)?;

    let improved = PrFlags {
        estimated: set_estimate > existing.max_estimated,
        weight: set.weight_kg > existing.max_weight,
        reps: set.reps > existing.max_reps,
    };

    let record = PersonalRecord {
        max_estimated: existing.max_estimated.max(set_estimate),
        max_weight: existing.max_weight.max(set.weight_kg),
        max_reps: existing.max_reps.max(set.reps),
        total_sets: existing.total_sets + 1,
    };

    Ok(RecordUpdate {
        record,
        improved,
        set_estimate,
    })
}

/// Rebuild a record from an exercise's full history.
///
/// An empty history yields the all-zero record. Any invalid set fails the
/// whole fold rather than being skipped.
pub fn fold<'a, I>(history: I) -> Result<PersonalRecord>
where
    I: IntoIterator<Item = &'a LoggedSet>,
{
    history
        .into_iter()
        .try_fold(PersonalRecord::default(), |record, set| {
            update(&record, set).map(|u| u.record)
        })
}

/// Replay a history in order and return the update produced by each set
pub fn replay<'a, I>(history: I) -> Result<Vec<(&'a LoggedSet, RecordUpdate)>>
where
    I: IntoIterator<Item = &'a LoggedSet>,
{
    let mut record = PersonalRecord::default();
    let mut updates = Vec::new();
    for set in history {
        let u = update(&record, set)?;
        record = u.record;
        updates.push((set, u));
    }
    Ok(updates)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
