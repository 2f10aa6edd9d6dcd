//! Startup orchestration.
//!
//! Resolves the effective configuration from an optional file and
//! command-line overrides, then installs logging. Any error here is fatal to
//! the process.

use std::path::Path;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::config::{
    load_config, validate_config, ConfigError, MediatorConfig, ObservabilityConfig,
};
use crate::observability::logging;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to install log subscriber: {0}")]
    Logging(#[from] TryInitError),
}

/// Resolve configuration and install logging from it.
///
/// A configuration error is reported through a subscriber built from the
/// default observability settings before it is returned.
pub fn init(
    config_path: Option<&Path>,
    bind_override: Option<&str>,
) -> Result<MediatorConfig, StartupError> {
    let config = match resolve_config(config_path, bind_override) {
        Ok(config) => config,
        Err(e) => {
            let _ = logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    logging::init_logging(&config.observability)?;
    Ok(config)
}

/// Build the configuration the process will run with.
///
/// Without a file the defaults are used. `bind_override` replaces
/// `listener.bind_address` and is validated like the rest of the file.
pub fn resolve_config(
    config_path: Option<&Path>,
    bind_override: Option<&str>,
) -> Result<MediatorConfig, ConfigError> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => MediatorConfig::default(),
    };

    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}
