//! One-rep max estimation
//!
//! Extrapolates a submaximal set to the heaviest load that could be lifted
//! for a single repetition, using the Epley formula:
//! `weight * (1 + reps / 30)`. A single is already a max attempt and is
//! returned unchanged.

use crate::error::{EngineError, Result};

/// Denominator of the Epley formula
const EPLEY_DIVISOR: f64 = 30.0;

/// Bounds of the perceived-effort scale
pub const RPE_MIN: f64 = 1.0;
pub const RPE_MAX: f64 = 10.0;

/// Estimate the one-rep max of a set.
///
/// Strictly increasing in both `weight_kg` and `reps`; returns exactly
/// `weight_kg` when `reps == 1`.
pub fn estimate(weight_kg: f64, reps: u32) -> Result<f64> {
  validate_weight(weight_kg)?;
  if reps == 0 {
    return Err(EngineError::validation("reps must be at least 1"));
  }
  Ok(epley(weight_kg, reps as f64))
}

/// Estimate the one-rep max, crediting reps left in reserve.
///
/// An RPE of 10 means nothing was left, so the result matches [`estimate`];
/// lower ratings add `10 - rpe` reps before extrapolating. `None` behaves
/// exactly like [`estimate`].
pub fn estimate_with_effort(weight_kg: f64, reps: u32, rpe: Option<f64>) -> Result<f64> {
  let base = estimate(weight_kg, reps)?;
  let Some(rpe) = rpe else {
    return Ok(base);
  };
  validate_rpe(rpe)?;

  let reps_in_reserve = RPE_MAX - rpe;
  Ok(epley(weight_kg, reps as f64 + reps_in_reserve))
}

/// Reject ratings outside the 1-10 scale
pub fn validate_rpe(rpe: f64) -> Result<()> {
  if !rpe.is_finite() || !(RPE_MIN..=RPE_MAX).contains(&rpe) {
    return Err(EngineError::validation(format!(
      "rpe must be between {} and {}, got {}",
      RPE_MIN, RPE_MAX, rpe
    )));
  }
  Ok(())
}

fn validate_weight(weight_kg: f64) -> Result<()> {
  if !weight_kg.is_finite() || weight_kg <= 0.0 {
    return Err(EngineError::validation(format!(
      "weight must be positive, got {}",
      weight_kg
    )));
  }
  Ok(())
}

fn epley(weight_kg: f64, reps: f64) -> f64 {
  // Exact identity for singles, no floating point drift
  if reps <= 1.0 {
    return weight_kg;
  }
  weight_kg * (1.0 + reps / EPLEY_DIVISOR)
}
