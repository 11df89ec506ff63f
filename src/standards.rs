//! Strength standards catalog
//!
//! Bodyweight multipliers per exercise and tier (adult male reference,
//! simplified Symmetric Strength / powerlifting standards), plus the chain
//! of strategies that maps a free-form exercise name onto a catalog row.
//!
//! The catalog is a plain value: the built-in table or one loaded from JSON.
//! Swapping it never touches lookup or classification code.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// ---------------------------------------------------------------------------
/// Tiers
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  Beginner,
  Novice,
  Intermediate,
  Advanced,
  Elite,
}

impl Tier {
  /// All tiers, weakest first
  pub const ALL: [Tier; 5] = [
    Tier::Beginner,
    Tier::Novice,
    Tier::Intermediate,
    Tier::Advanced,
    Tier::Elite,
  ];

  pub fn index(self) -> usize {
    self as usize
  }

  /// The tier immediately above, `None` for elite
  pub fn next(self) -> Option<Tier> {
    Tier::ALL.get(self.index() + 1).copied()
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Tier::Beginner => "beginner",
      Tier::Novice => "novice",
      Tier::Intermediate => "intermediate",
      Tier::Advanced => "advanced",
      Tier::Elite => "elite",
    }
  }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Tier {
  type Err = String;
  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    Tier::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| format!("Unknown strength tier: {}", s))
  }
}

/// ---------------------------------------------------------------------------
/// Standard Rows
/// ---------------------------------------------------------------------------

/// Bodyweight multipliers for one exercise, one per tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthStandardRow {
  pub beginner: f64,
  pub novice: f64,
  pub intermediate: f64,
  pub advanced: f64,
  pub elite: f64,
}

impl StrengthStandardRow {
  pub const fn new(multipliers: [f64; 5]) -> Self {
    Self {
      beginner: multipliers[0],
      novice: multipliers[1],
      intermediate: multipliers[2],
      advanced: multipliers[3],
      elite: multipliers[4],
    }
  }

  pub fn multiplier(&self, tier: Tier) -> f64 {
    match tier {
      Tier::Beginner => self.beginner,
      Tier::Novice => self.novice,
      Tier::Intermediate => self.intermediate,
      Tier::Advanced => self.advanced,
      Tier::Elite => self.elite,
    }
  }

  /// Multipliers must be finite, non-negative and non-decreasing by tier
  pub fn validate(&self) -> std::result::Result<(), String> {
    let mut prev = 0.0;
    for tier in Tier::ALL {
      let m = self.multiplier(tier);
      if !m.is_finite() || m < 0.0 {
        return Err(format!("{} multiplier must be a non-negative number, got {}", tier, m));
      }
      if m < prev {
        return Err(format!("{} multiplier {} is below the previous tier ({})", tier, m, prev));
      }
      prev = m;
    }
    Ok(())
  }
}

/// Catalog entry as it appears in a standards file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardEntry {
  pub name: String,
  #[serde(flatten)]
  pub row: StrengthStandardRow,
}

/// Built-in table, in declaration order (substring matching depends on it)
const DEFAULT_STANDARDS: &[(&str, [f64; 5])] = &[
  // Press
  ("bench press", [0.5, 0.75, 1.0, 1.5, 2.0]),
  ("incline bench press", [0.4, 0.65, 0.85, 1.25, 1.75]),
  ("overhead press", [0.35, 0.5, 0.65, 0.95, 1.35]),
  ("dumbbell press", [0.25, 0.4, 0.55, 0.8, 1.1]),
  // Squat
  ("squat", [0.75, 1.0, 1.5, 2.0, 2.5]),
  ("smith machine squat", [0.7, 0.95, 1.4, 1.9, 2.4]),
  ("front squat", [0.6, 0.85, 1.2, 1.7, 2.2]),
  ("leg press", [1.5, 2.0, 2.75, 3.5, 4.5]),
  // Deadlift
  ("deadlift", [0.75, 1.25, 1.75, 2.5, 3.0]),
  ("romanian deadlift", [0.6, 0.95, 1.35, 1.9, 2.5]),
  ("sumo deadlift", [0.7, 1.2, 1.7, 2.4, 2.9]),
  // Pull (added load relative to bodyweight for pull-ups/chin-ups)
  ("pull-up", [0.0, 0.15, 0.35, 0.65, 1.0]),
  ("chin-up", [0.0, 0.2, 0.4, 0.7, 1.1]),
  ("barbell row", [0.5, 0.75, 1.0, 1.4, 1.9]),
  ("dumbbell row", [0.25, 0.4, 0.55, 0.8, 1.1]),
  // Accessories
  ("bicep curl", [0.15, 0.25, 0.35, 0.5, 0.7]),
  ("tricep extension", [0.2, 0.3, 0.45, 0.65, 0.9]),
  ("lateral raise", [0.08, 0.12, 0.18, 0.25, 0.35]),
];

/// Equipment words that do not change which standard applies
const EQUIPMENT_WORDS: &[&str] = &["barbell", "dumbbell", "cable", "machine"];

/// ---------------------------------------------------------------------------
/// Catalog
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthStandardsCatalog {
  /// Keys are stored normalized, order is preserved from the source
  entries: Vec<(String, StrengthStandardRow)>,
}

impl Default for StrengthStandardsCatalog {
  fn default() -> Self {
    Self {
      entries: DEFAULT_STANDARDS
        .iter()
        .map(|(name, m)| (normalize_name(name), StrengthStandardRow::new(*m)))
        .collect(),
    }
  }
}

impl StrengthStandardsCatalog {
  /// Build a catalog from entries, validating every row
  pub fn from_entries(entries: Vec<StandardEntry>) -> Result<Self> {
    let mut normalized: Vec<(String, StrengthStandardRow)> = Vec::with_capacity(entries.len());
    for entry in entries {
      let key = normalize_name(&entry.name);
      if key.is_empty() {
        return Err(EngineError::Catalog("entry with an empty exercise name".into()));
      }
      entry
        .row
        .validate()
        .map_err(|e| EngineError::Catalog(format!("{}: {}", key, e)))?;
      if normalized.iter().any(|(k, _)| *k == key) {
        return Err(EngineError::Catalog(format!("duplicate exercise: {}", key)));
      }
      normalized.push((key, entry.row));
    }
    Ok(Self { entries: normalized })
  }

  /// Parse a JSON array of `{ "name": ..., "beginner": ..., ... }` entries
  pub fn from_json_str(json: &str) -> Result<Self> {
    let entries: Vec<StandardEntry> = serde_json::from_str(json)?;
    Self::from_entries(entries)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
      .map_err(|e| EngineError::Catalog(format!("Failed to read {}: {}", path.display(), e)))?;
    Self::from_json_str(&json)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Row stored under an already-normalized key
  pub fn get(&self, key: &str) -> Option<&StrengthStandardRow> {
    self
      .entries
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, row)| row)
  }

  pub fn entries(&self) -> impl Iterator<Item = (&str, &StrengthStandardRow)> {
    self.entries.iter().map(|(k, row)| (k.as_str(), row))
  }

  /// Resolve an arbitrary exercise name to a standard.
  ///
  /// Tries each strategy of [`MATCH_CHAIN`] in order and stops at the first
  /// hit. `None` means the exercise cannot be classified.
  pub fn lookup(&self, exercise_name: &str) -> Option<&StrengthStandardRow> {
    self.lookup_with_key(exercise_name).map(|(_, row)| row)
  }

  /// Like [`lookup`](Self::lookup) but also returns the matched catalog key
  pub fn lookup_with_key(&self, exercise_name: &str) -> Option<(&str, &StrengthStandardRow)> {
    MATCH_CHAIN
      .iter()
      .find_map(|strategy| strategy(self, exercise_name))
      .and_then(|key| self.entries().find(|(k, _)| *k == key))
  }
}

/// ---------------------------------------------------------------------------
/// Matching Strategies
/// ---------------------------------------------------------------------------

/// A strategy returns the catalog key it matched
pub type MatchStrategy = for<'c> fn(&'c StrengthStandardsCatalog, &str) -> Option<&'c str>;

/// Lookup order: exact, equipment-stripped, substring, keyword
pub const MATCH_CHAIN: [MatchStrategy; 4] = [
  match_exact,
  match_stripped,
  match_substring,
  match_keyword,
];

/// Case-insensitive, whitespace-collapsed equality
pub fn match_exact<'c>(catalog: &'c StrengthStandardsCatalog, name: &str) -> Option<&'c str> {
  find_key(catalog, &normalize_name(name))
}

/// Equality after dropping parentheticals and equipment words
pub fn match_stripped<'c>(catalog: &'c StrengthStandardsCatalog, name: &str) -> Option<&'c str> {
  let stripped = strip_qualifiers(name);
  if stripped.is_empty() {
    return None;
  }
  find_key(catalog, &stripped)
}

/// First catalog key containing the stripped name, or contained in it
pub fn match_substring<'c>(catalog: &'c StrengthStandardsCatalog, name: &str) -> Option<&'c str> {
  let stripped = strip_qualifiers(name);
  if stripped.is_empty() {
    return None;
  }
  catalog
    .entries()
    .map(|(k, _)| k)
    .find(|k| stripped.contains(k) || k.contains(stripped.as_str()))
}

/// Keyword families for names the other strategies miss
pub fn match_keyword<'c>(catalog: &'c StrengthStandardsCatalog, name: &str) -> Option<&'c str> {
  let stripped = strip_qualifiers(name);
  if stripped.is_empty() {
    return None;
  }
  let has = |word: &str| stripped.contains(word);

  let target = if has("press") && has("bench") {
    "bench press"
  } else if has("press") && (has("shoulder") || has("overhead")) {
    "overhead press"
  } else if has("squat") {
    "squat"
  } else if has("deadlift") || has("rdl") {
    "romanian deadlift"
  } else if has("row") {
    "barbell row"
  } else if has("pull") && has("up") {
    "pull-up"
  } else {
    return None;
  };

  find_key(catalog, target)
}

fn find_key<'c>(catalog: &'c StrengthStandardsCatalog, key: &str) -> Option<&'c str> {
  catalog.entries().map(|(k, _)| k).find(|k| *k == key)
}

/// Lowercase, trim and collapse internal whitespace
pub fn normalize_name(name: &str) -> String {
  name
    .split_whitespace()
    .map(str::to_lowercase)
    .collect::<Vec<_>>()
    .join(" ")
}

/// Normalize, then drop `(...)` qualifiers and equipment words
pub fn strip_qualifiers(name: &str) -> String {
  let mut without_parens = String::with_capacity(name.len());
  let mut depth = 0usize;
  for c in name.chars() {
    match c {
      '(' => depth += 1,
      ')' if depth > 0 => depth -= 1,
      _ if depth == 0 => without_parens.push(c),
      _ => {}
    }
  }

  normalize_name(&without_parens)
    .split(' ')
    .filter(|word| !word.is_empty() && !EQUIPMENT_WORDS.contains(word))
    .collect::<Vec<_>>()
    .join(" ")
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
