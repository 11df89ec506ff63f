pub mod aggregation;
pub mod attendance;
pub mod classifier;
pub mod commands;
pub mod config;
pub mod error;
pub mod estimator;
pub mod logging;
pub mod models;
pub mod records;
pub mod standards;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

pub use classifier::{Classification, Gender, GenderFactors};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use records::{PersonalRecord, RecordUpdate};
pub use standards::{StrengthStandardsCatalog, Tier};
pub use state::AppState;
pub use store::{MemoryStore, RecordCache, SetSource};

/// Build application state over the host's collaborators
pub fn bootstrap(source: Arc<dyn SetSource>, cache: Arc<dyn RecordCache>) -> Result<AppState> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  logging::init_logging();

  let config = EngineConfig::from_env()?;
  let catalog = config.load_catalog()?;
  tracing::info!(
    standards = catalog.len(),
    custom_catalog = config.standards_path.is_some(),
    "Strength engine ready"
  );

  Ok(AppState::new(source, cache, catalog, config))
}
