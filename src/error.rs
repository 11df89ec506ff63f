use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

/// Every failure the engine reports. "No standard for this exercise" and
/// "no history yet" are not errors: they come back as `None` or as zeroed
/// records and empty reports.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum EngineError {
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Strength standards error: {0}")]
  Catalog(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Storage error: {0}")]
  Storage(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
  pub fn validation(msg: impl Into<String>) -> Self {
    EngineError::Validation(msg.into())
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, EngineError::Validation(_))
  }
}

impl From<serde_json::Error> for EngineError {
  fn from(e: serde_json::Error) -> Self {
    EngineError::Catalog(e.to_string())
  }
}
