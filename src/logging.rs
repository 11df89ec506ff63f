/// Initialize structured logging with tracing
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Output is JSON.
/// Returns false when a global subscriber was already installed (by an
/// earlier call or by the host application), which is not an error.
pub fn init_logging() -> bool {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;
  use tracing_subscriber::EnvFilter;

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  let installed = tracing_subscriber::registry()
    .with(filter)
    .with(
      fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json(),
    )
    .try_init()
    .is_ok();

  if installed {
    tracing::info!("Structured logging initialized");
  }
  installed
}
