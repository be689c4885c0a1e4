//! Bootstrap utilities for programs embedding the registry.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LOG_ENV_VAR};

/// Initialize tracing with the KTF_LOG environment variable.
///
/// Falls back to the configured filter if KTF_LOG is not set. Returns false
/// if a global subscriber was already installed.
pub fn init_tracing(log: &LogConfig) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&log.filter)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
