use std::sync::Arc;

use crate::config::EngineConfig;
use crate::standards::StrengthStandardsCatalog;
use crate::store::{RecordCache, SetSource};

/// Application state shared by the query commands
#[derive(Clone)]
pub struct AppState {
  pub source: Arc<dyn SetSource>,
  pub cache: Arc<dyn RecordCache>,
  pub catalog: Arc<StrengthStandardsCatalog>,
  pub config: EngineConfig,
}

impl AppState {
  pub fn new(
    source: Arc<dyn SetSource>,
    cache: Arc<dyn RecordCache>,
    catalog: StrengthStandardsCatalog,
    config: EngineConfig,
  ) -> Self {
    Self {
      source,
      cache,
      catalog: Arc::new(catalog),
      config,
    }
  }

  /// Replace the standards catalog without touching anything else
  pub fn with_catalog(mut self, catalog: StrengthStandardsCatalog) -> Self {
    self.catalog = Arc::new(catalog);
    self
  }
}

impl std::fmt::Debug for AppState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppState")
      .field("catalog_entries", &self.catalog.len())
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}
