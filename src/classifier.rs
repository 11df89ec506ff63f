//! Bodyweight-relative strength classification
//!
//! Ratio = estimated max / bodyweight, compared against the standards row
//! scaled by a gender factor. The current tier is the highest one whose
//! threshold the ratio meets; beginner has no lower bound.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::standards::{StrengthStandardRow, StrengthStandardsCatalog, Tier};

/// Male standards are the reference table
pub const DEFAULT_MALE_FACTOR: f64 = 1.0;

/// Female standards approximated as a fixed share of the male table.
/// Not derived from a dataset; override through `GenderFactors`.
pub const DEFAULT_FEMALE_FACTOR: f64 = 0.65;

// ---------------------------------------------------------------------------
/// Gender and its scaling factor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderFactors {
    pub male: f64,
    pub female: f64,
}

impl Default for GenderFactors {
    fn default() -> Self {
        Self {
            male: DEFAULT_MALE_FACTOR,
            female: DEFAULT_FEMALE_FACTOR,
        }
    }
}

impl GenderFactors {
    pub fn factor(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }
}

// ---------------------------------------------------------------------------
/// Classification result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub tier: Tier,
    /// Bodyweight ratio required, gender factor applied
    pub ratio: f64,
    /// Absolute load required at this bodyweight
    pub load: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextTier {
    pub tier: Tier,
    pub target: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: Tier,
    pub ratio: f64,
    pub estimated_max: f64,
    pub body_weight: f64,
    /// Full ladder, beginner first
    pub thresholds: [TierThreshold; 5],
    /// `None` once elite is reached
    pub next: Option<NextTier>,
}

impl Classification {
    pub fn threshold(&self, tier: Tier) -> &TierThreshold {
        &self.thresholds[tier.index()]
    }

    /// Fraction of the way from the current tier's load to the next tier's
    /// target, in `[0, 1]`. `None` at elite.
    pub fn progress_to_next(&self) -> Option<f64> {
        let next = self.next?;
        let floor = self.threshold(self.tier).load;
        let span = next.target - floor;
        if span <= 0.0 {
            return Some(1.0);
        }
        Some(((self.estimated_max - floor) / span).clamp(0.0, 1.0))
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify an estimated max against one standards row
pub fn classify(
    row: &StrengthStandardRow,
    estimated_max: f64,
    body_weight: f64,
    gender: Gender,
    factors: &GenderFactors,
) -> Result<Classification> {
    if !body_weight.is_finite() || body_weight <= 0.0 {
        return Err(EngineError::validation(format!(
            "body weight must be positive, got {}",
            body_weight
        )));
    }
    if !estimated_max.is_finite() || estimated_max <= 0.0 {
        return Err(EngineError::validation(format!(
            "estimated max must be positive, got {}",
            estimated_max
        )));
    }

    let factor = factors.factor(gender);
    let ratio = estimated_max / body_weight;

    let thresholds = Tier::ALL.map(|tier| {
        let scaled = row.multiplier(tier) * factor;
        TierThreshold {
            tier,
            ratio: scaled,
            load: scaled * body_weight,
        }
    });

    let tier = thresholds
        .iter()
        .rev()
        .find(|t| ratio >= t.ratio)
        .map(|t| t.tier)
        .unwrap_or(Tier::Beginner);

    let next = tier.next().map(|next_tier| {
        let target = thresholds[next_tier.index()].load;
        NextTier {
            tier: next_tier,
            target,
            gap: (target - estimated_max).max(0.0),
        }
    });

    Ok(Classification {
        tier,
        ratio,
        estimated_max,
        body_weight,
        thresholds,
        next,
    })
}

/// Look up the exercise's standard and classify against it.
///
/// `Ok(None)` when no standard matches the name: classification is
/// unavailable, which is not an error.
pub fn classify_exercise(
    catalog: &StrengthStandardsCatalog,
    exercise_name: &str,
    estimated_max: f64,
    body_weight: f64,
    gender: Gender,
    factors: &GenderFactors,
) -> Result<Option<Classification>> {
    catalog
        .lookup(exercise_name)
        .map(|row| classify(row, estimated_max, body_weight, gender, factors))
        .transpose()
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
