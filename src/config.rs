//! Engine configuration from the environment
//!
//! Variables (all optional):
//! - `STRENGTH_STANDARDS_PATH` - JSON standards file replacing the built-in table
//! - `STRENGTH_FEMALE_FACTOR` - share of the male standards used for women
//! - `STRENGTH_WEEKLY_GOAL` - default training days per week
//! - `STRENGTH_TOP_LIFTS` - exercises listed on ranking cards
//! - `STRENGTH_TOTAL_LIFTS` - best lifts summed into the total-strength score
//! - `STRENGTH_PROGRESS_DAYS` - length of the estimated max history window

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::{GenderFactors, DEFAULT_FEMALE_FACTOR, DEFAULT_MALE_FACTOR};
use crate::error::{EngineError, Result};
use crate::standards::StrengthStandardsCatalog;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_WEEKLY_GOAL: u32 = 3;
const DEFAULT_TOP_LIFTS: usize = 5;
const DEFAULT_TOTAL_LIFTS: usize = 3;
const DEFAULT_PROGRESS_DAYS: u32 = 90;
/// A century of history
const MAX_PROGRESS_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
  pub standards_path: Option<PathBuf>,
  pub gender_factors: GenderFactors,
  pub weekly_goal: u32,
  pub top_lifts: usize,
  pub total_strength_lifts: usize,
  pub progress_days: u32,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      standards_path: None,
      gender_factors: GenderFactors::default(),
      weekly_goal: DEFAULT_WEEKLY_GOAL,
      top_lifts: DEFAULT_TOP_LIFTS,
      total_strength_lifts: DEFAULT_TOTAL_LIFTS,
      progress_days: DEFAULT_PROGRESS_DAYS,
    }
  }
}

impl EngineConfig {
  /// Read configuration from the process environment, falling back to
  /// defaults for unset variables. Call `dotenvy::dotenv()` first to pick
  /// up a `.env` file.
  pub fn from_env() -> Result<Self> {
    let female = parse_var("STRENGTH_FEMALE_FACTOR", DEFAULT_FEMALE_FACTOR)?;
    if !female.is_finite() || female <= 0.0 {
      return Err(EngineError::Config(format!(
        "STRENGTH_FEMALE_FACTOR must be positive, got {}",
        female
      )));
    }

    let weekly_goal = parse_var("STRENGTH_WEEKLY_GOAL", DEFAULT_WEEKLY_GOAL)?;
    if !(1..=7).contains(&weekly_goal) {
      return Err(EngineError::Config(format!(
        "STRENGTH_WEEKLY_GOAL must be between 1 and 7, got {}",
        weekly_goal
      )));
    }

    let progress_days = parse_var("STRENGTH_PROGRESS_DAYS", DEFAULT_PROGRESS_DAYS)?;
    if !(1..=MAX_PROGRESS_DAYS).contains(&progress_days) {
      return Err(EngineError::Config(format!(
        "STRENGTH_PROGRESS_DAYS must be between 1 and {}, got {}",
        MAX_PROGRESS_DAYS, progress_days
      )));
    }

    Ok(Self {
      standards_path: env::var_os("STRENGTH_STANDARDS_PATH")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from),
      gender_factors: GenderFactors {
        male: DEFAULT_MALE_FACTOR,
        female,
      },
      weekly_goal,
      top_lifts: parse_var("STRENGTH_TOP_LIFTS", DEFAULT_TOP_LIFTS)?,
      total_strength_lifts: parse_var("STRENGTH_TOTAL_LIFTS", DEFAULT_TOTAL_LIFTS)?,
      progress_days,
    })
  }

  /// The configured standards file, or the built-in table
  pub fn load_catalog(&self) -> Result<StrengthStandardsCatalog> {
    match &self.standards_path {
      Some(path) => StrengthStandardsCatalog::from_path(path),
      None => Ok(StrengthStandardsCatalog::default()),
    }
  }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(name) {
    Ok(raw) if raw.trim().is_empty() => Ok(default),
    Ok(raw) => raw
      .trim()
      .parse()
      .map_err(|e| EngineError::Config(format!("{}={:?}: {}", name, raw, e))),
    Err(env::VarError::NotPresent) => Ok(default),
    Err(e) => Err(EngineError::Config(format!("{}: {}", name, e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 6] = [
    "STRENGTH_STANDARDS_PATH",
    "STRENGTH_FEMALE_FACTOR",
    "STRENGTH_WEEKLY_GOAL",
    "STRENGTH_TOP_LIFTS",
    "STRENGTH_TOTAL_LIFTS",
    "STRENGTH_PROGRESS_DAYS",
  ];

  fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
    VARS.iter().map(|v| (*v, None)).collect()
  }

  #[test]
  #[serial]
  fn test_defaults_when_unset() {
    temp_env::with_vars(unset_all(), || {
      let config = EngineConfig::from_env().unwrap();
      assert_eq!(config, EngineConfig::default());
      assert_eq!(config.gender_factors.female, 0.65);
      assert_eq!(config.weekly_goal, 3);
    });
  }

  #[test]
  #[serial]
  fn test_reads_overrides() {
    let vars = [
      ("STRENGTH_STANDARDS_PATH", None),
      ("STRENGTH_FEMALE_FACTOR", Some("0.7")),
      ("STRENGTH_WEEKLY_GOAL", Some("4")),
      ("STRENGTH_TOP_LIFTS", Some(" 10 ")),
      ("STRENGTH_TOTAL_LIFTS", None),
      ("STRENGTH_PROGRESS_DAYS", None),
    ];
    temp_env::with_vars(vars, || {
      let config = EngineConfig::from_env().unwrap();
      assert_eq!(config.gender_factors.female, 0.7);
      assert_eq!(config.gender_factors.male, 1.0);
      assert_eq!(config.weekly_goal, 4);
      assert_eq!(config.top_lifts, 10);
    });
  }

  #[test]
  #[serial]
  fn test_rejects_invalid_values() {
    temp_env::with_var("STRENGTH_WEEKLY_GOAL", Some("often"), || {
      assert!(matches!(EngineConfig::from_env(), Err(EngineError::Config(_))));
    });
    temp_env::with_var("STRENGTH_WEEKLY_GOAL", Some("9"), || {
      assert!(EngineConfig::from_env().is_err());
    });
    temp_env::with_var("STRENGTH_FEMALE_FACTOR", Some("-1"), || {
      assert!(EngineConfig::from_env().is_err());
    });
    temp_env::with_var("STRENGTH_PROGRESS_DAYS", Some("0"), || {
      assert!(EngineConfig::from_env().is_err());
    });
    temp_env::with_var("STRENGTH_PROGRESS_DAYS", Some("4000000000"), || {
      assert!(matches!(EngineConfig::from_env(), Err(EngineError::Config(_))));
    });
    temp_env::with_var("STRENGTH_PROGRESS_DAYS", Some("36500"), || {
      assert_eq!(EngineConfig::from_env().unwrap().progress_days, 36_500);
    });
  }

  #[test]
  #[serial]
  fn test_loads_catalog_from_configured_path() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/strength_standards.json");
    temp_env::with_var("STRENGTH_STANDARDS_PATH", Some(path), || {
      let config = EngineConfig::from_env().unwrap();
      assert_eq!(config.standards_path.as_deref(), Some(std::path::Path::new(path)));
      assert_eq!(config.load_catalog().unwrap().len(), 18);
    });
  }

  #[test]
  fn test_default_config_uses_builtin_catalog() {
    let catalog = EngineConfig::default().load_catalog().unwrap();
    assert_eq!(catalog, StrengthStandardsCatalog::default());
  }
}
